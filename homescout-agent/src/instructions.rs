//! Fixed sentences and instruction texts shared by the roles.

/// Emitted by the retrieval role when a search matches nothing.
pub const NO_LISTINGS_FOUND: &str = "No property listings were found for this query.";

/// Emitted by the translation role when there is nothing to translate.
pub const NOTHING_TO_TRANSLATE: &str = "There are no property listings to translate yet.";

/// Coordinator answer to general questions when no chat model is configured.
pub const HELP_TEXT: &str = "I can search the property listings for you or translate the latest \
results. Try asking for something like \"find 3-bedroom flats near a primary school\".";

pub const DEFAULT_TARGET_LANGUAGE: &str = "Spanish";

pub fn coordinator_instructions(retrieval: &str, translation: &str) -> String {
    format!(
        "You are a coordinator. \
         1. For property searches, hand off to {retrieval}. \
         2. If the user asks to translate the results or 'translate that', hand off to {translation}. \
         3. Always summarize and present the final output from any role to the user."
    )
}

pub fn retrieval_instructions(tool: &str, coordinator: &str) -> String {
    format!(
        "You are a retrieval specialist. \
         Use the {tool} tool for any property inquiry. \
         If the tool returns 'NO_PROPERTIES_FOUND' or an empty list, \
         tell {coordinator} exactly this: '{NO_LISTINGS_FOUND}'"
    )
}

pub fn translation_instructions(retrieval: &str, language: &str) -> String {
    format!(
        "You are a translation assistant. \
         Find the property listings provided by {retrieval} earlier in the chat \
         and translate them into {language}. \
         Provide only the translated text."
    )
}
