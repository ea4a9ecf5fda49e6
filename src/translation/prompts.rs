/*!
 * Prompt text for field translation.
 *
 * Every field is sent as its own chat exchange: a fixed system instruction
 * and a user message wrapping the literal field value.
 */

/// System instruction for a target language
pub fn system_prompt(target_language: &str) -> String {
    format!(
        "I want you to act as an {target_language} translator, spelling corrector and improver. \
         You are also proficient in professional vocabulary such as software programs, \
         mathematics, physics, chemistry and literature."
    )
}

/// User message carrying the text to translate
pub fn user_prompt(text: &str, target_language: &str) -> String {
    format!(
        "I will talk to you in any language and you will detect the language, translate it \
         and answer with a corrected and improved version of my text, in {target_language}. \
         If you encounter any software programming language (Python, Javascript, C++, Swift, etc.) \
         or mathematical calculations, do not translate them, keep them as they are. \
         Keep the same meaning. Reply only with the translation, nothing else, \
         no explanation and no comments or notes. The text is:\n\n{text}"
    )
}
