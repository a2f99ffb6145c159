//! Prompt assembly for grounded, cited answers.
//!
//! Each chunk becomes a labeled block `[source <i> | page <p>]`, numbered from 1 in the order
//! given. The framing that follows tells the model to answer only from those blocks, to cite
//! the source number and page, and to say "I don't know" when the answer is absent.

#[cfg(test)]
mod tests;

use std::fmt::Write;

use crate::chunking::Chunk;
use crate::scoring::ScoredChunk;

/// Opening instruction of the framing block.
pub const ROLE_INSTRUCTION: &str = "You are a helpful AWS assistant.";

/// Restricts the model to the supplied context.
pub const GROUNDING_INSTRUCTION: &str =
    "Use ONLY the context provided below to answer the question.";

/// Citation requirement.
pub const CITATION_INSTRUCTION: &str = "Cite the source number and page in your answer.";

/// Fallback when the context does not contain the answer.
pub const FALLBACK_INSTRUCTION: &str = "If the answer is not found, say \"I don't know\".";

/// Cue the completion continues from.
pub const ANSWER_CUE: &str = "Answer (with citation):";

/// Something that can be cited in a prompt.
pub trait ContextBlock {
    fn page(&self) -> u32;
    fn text(&self) -> &str;
}

impl ContextBlock for Chunk {
    fn page(&self) -> u32 {
        self.page_number
    }

    fn text(&self) -> &str {
        &self.text
    }
}

impl ContextBlock for ScoredChunk {
    fn page(&self) -> u32 {
        self.chunk.page_number
    }

    fn text(&self) -> &str {
        &self.chunk.text
    }
}

/// Labels every block in input order, 1-indexed.
pub fn format_context<C: ContextBlock>(blocks: &[C]) -> String {
    let mut context = String::new();
    for (i, block) in blocks.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            context,
            "[source {} | page {}]\n{}\n\n",
            i + 1,
            block.page(),
            block.text()
        );
    }
    context
}

/// Builds the instruction text for `question` over all of `blocks`.
///
/// The output is a pure function of its inputs.
pub fn build_prompt<C: ContextBlock>(blocks: &[C], question: &str) -> String {
    let context = format_context(blocks);
    format!(
        "{ROLE_INSTRUCTION}\n{GROUNDING_INSTRUCTION}\n{CITATION_INSTRUCTION}\n{FALLBACK_INSTRUCTION}\n\n\
         Context:\n{context}\n\
         Question:\n{question}\n\n\
         {ANSWER_CUE}"
    )
}
