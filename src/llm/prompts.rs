//! Prompt templates for the two generation calls in the pipeline.
//!
//! Kept as pure functions of their structured inputs so they can be tested
//! without touching any model backend.

/// Rewrite a follow-up question into a standalone one.
///
/// The worked example pins down the expected behavior for the model:
/// entities mentioned only in the history (here, the city) must be restated
/// explicitly in the rewritten question.
pub fn condense_prompt(chat_history: &str, question: &str) -> String {
    format!(
        "Given the following chat history and a follow-up question, rephrase the \
follow-up question as a standalone question. The standalone question MUST \
explicitly include the main topic from the chat history (such as a city name) \
even if the follow-up only refers to it implicitly. Preserve the intent of the \
follow-up question and do not add any facts that are not in the chat history.\n\
\n\
Example:\n\
Chat history:\n\
User: Konya'da ne yenir?\n\
Assistant: Konya'da etli ekmek yiyebilirsiniz.\n\
Follow-up question: peki orada nereler gezilir?\n\
Standalone question: Konya'da nereler gezilir?\n\
\n\
Chat history:\n\
{chat_history}\n\
Follow-up question: {question}\n\
Standalone question:"
    )
}

/// Answer a standalone question from retrieved context, grounded.
///
/// The instructions mirror the product contract: answer only from the given
/// context, no repetition, a warm guide-like tone, and the configured
/// `fallback` sentence verbatim when the context does not cover the question.
pub fn answer_prompt(context: &str, question: &str, fallback: &str) -> String {
    format!(
        "You are a friendly and helpful tour guide who knows everything about the \
places described below. Use ONLY the following pieces of context to answer the \
question at the end. Combine the information into a single flowing paragraph \
without repeating yourself, and keep the tone warm and conversational, as if \
chatting with a guide. If the context does not contain the answer, or the \
question is off-topic, reply with exactly this sentence and nothing else:\n\
{fallback}\n\
\n\
Context:\n\
{context}\n\
\n\
Question: {question}\n\
\n\
Helpful answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condense_prompt_embeds_history_and_question() {
        let prompt = condense_prompt(
            "User: Konya'da ne yenir?\nAssistant: Etli ekmek.",
            "peki orada nereler gezilir?",
        );

        assert!(prompt.contains("User: Konya'da ne yenir?"));
        assert!(prompt.contains("Follow-up question: peki orada nereler gezilir?"));
        assert!(prompt.ends_with("Standalone question:"));
    }

    #[test]
    fn answer_prompt_embeds_context_question_and_fallback() {
        let prompt = answer_prompt("Konya'da etli ekmek meşhurdur.", "Konya'da ne yenir?", "NO_INFO");

        assert!(prompt.contains("Konya'da etli ekmek meşhurdur."));
        assert!(prompt.contains("Question: Konya'da ne yenir?"));
        assert!(prompt.contains("NO_INFO"));
    }
}
