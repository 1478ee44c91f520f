//! Context assembly for retrieval-augmented generation
//!
//! Decides what, if anything, to tell the model about retrieved records:
//! takes the last message of the conversation as the query, retrieves the
//! top-K nearest records, and inserts exactly one synthesized system message
//! immediately before that last message. When retrieval fails the caller
//! logs the error and the conversation proceeds unmodified.

use crate::completion::ChatMessage;
use crate::error::Result;
use crate::vectorstore::{QueryResult, VectorStoreClient, DEFAULT_QUERY_LIMIT};

const CONTEXT_PREAMBLE: &str =
    "Here are some records from the database that may help answer your query:\n\n";

const CONTEXT_POSTAMBLE: &str = "\nUse the above information to answer the user's question. \
     If you don't have enough information to answer completely, acknowledge what you know and what you don't know.";

/// Retrieve context for the conversation and insert it as a system message.
///
/// Mutates `messages` in place; on success exactly one message is added and
/// none are replaced or removed. An empty conversation is left untouched.
pub async fn augment(store: &VectorStoreClient, messages: &mut Vec<ChatMessage>) -> Result<()> {
    let query = match messages.last() {
        Some(last) => last.content.clone(),
        None => return Ok(()),
    };

    let results = store.query(&query, DEFAULT_QUERY_LIMIT).await?;
    let context = build_context_message(results, &query);
    insert_before_last(messages, context);
    Ok(())
}

/// Render retrieved records into the single system context message.
///
/// Records are ordered oldest-first; ties keep their retrieval order. With
/// no records, the fallback names the literal query text so the model can
/// acknowledge the gap.
pub fn build_context_message(mut results: Vec<QueryResult>, query: &str) -> ChatMessage {
    if results.is_empty() {
        return ChatMessage::system(format!(
            "We were not able to find information in our database concerning this user's query: \
             \"{query}\". Try to answer if you know the answer; otherwise explain that you don't \
             have that information."
        ));
    }

    results.sort_by_key(|r| r.timestamp);

    let mut content = String::from(CONTEXT_PREAMBLE);
    for record in &results {
        content.push_str("- ");
        content.push_str(&record.text);
        content.push('\n');
    }
    content.push_str(CONTEXT_POSTAMBLE);

    ChatMessage::system(content)
}

/// Insert `context` immediately before the last message
fn insert_before_last(messages: &mut Vec<ChatMessage>, context: ChatMessage) {
    let position = messages.len().saturating_sub(1);
    messages.insert(position, context);
}
