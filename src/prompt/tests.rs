use super::*;

fn chunk(page: u32, index: u32, text: &str) -> Chunk {
    Chunk {
        page_number: page,
        chunk_index: index,
        text: text.to_string(),
    }
}

#[test]
fn test_format_context_labels_blocks_in_order() {
    let chunks = vec![chunk(7, 0, "alpha"), chunk(2, 1, "beta")];
    assert_eq!(
        format_context(&chunks),
        "[source 1 | page 7]\nalpha\n\n[source 2 | page 2]\nbeta\n\n"
    );
}

#[test]
fn test_prompt_contains_question_and_every_block() {
    let chunks: Vec<Chunk> = (0..5)
        .map(|i| chunk(i + 1, 0, &format!("passage number {}", i)))
        .collect();
    let question = "How do I create an S3 bucket?";
    let prompt = build_prompt(&chunks, question);

    assert!(prompt.contains(question));
    for i in 0..5u32 {
        assert!(prompt.contains(&format!("[source {} | page {}]", i + 1, i + 1)));
        assert!(prompt.contains(&format!("passage number {}", i)));
    }
    assert!(!prompt.contains("[source 6"));

    let positions: Vec<usize> = (1..=5)
        .map(|i| prompt.find(&format!("[source {} |", i)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_prompt_keeps_grounding_instructions() {
    let prompt = build_prompt(&[chunk(1, 0, "text")], "q");
    assert!(prompt.starts_with(ROLE_INSTRUCTION));
    assert!(prompt.contains(GROUNDING_INSTRUCTION));
    assert!(prompt.contains(CITATION_INSTRUCTION));
    assert!(prompt.contains("I don't know"));
    assert!(prompt.trim_end().ends_with(ANSWER_CUE));
}

#[test]
fn test_question_follows_context() {
    let prompt = build_prompt(&[chunk(3, 0, "context body")], "the question");
    let context_at = prompt.find("context body").unwrap();
    let question_at = prompt.find("Question:\nthe question").unwrap();
    let cue_at = prompt.find(ANSWER_CUE).unwrap();
    assert!(context_at < question_at);
    assert!(question_at < cue_at);
}

#[test]
fn test_empty_context_still_frames_question() {
    let prompt = build_prompt::<Chunk>(&[], "anything");
    assert!(!prompt.contains("[source"));
    assert!(prompt.contains("Question:\nanything"));
    assert!(prompt.contains(FALLBACK_INSTRUCTION));
}

#[test]
fn test_scored_chunks_use_their_chunk() {
    let scored = vec![
        ScoredChunk::new(chunk(9, 2, "top"), 4.5, 3),
        ScoredChunk::new(chunk(1, 0, "next"), 1.0, 0),
    ];
    let prompt = build_prompt(&scored, "q");
    assert!(prompt.contains("[source 1 | page 9]\ntop\n\n[source 2 | page 1]\nnext\n\n"));
}

#[test]
fn test_build_prompt_is_deterministic() {
    let chunks = vec![chunk(1, 0, "a"), chunk(2, 0, "b")];
    assert_eq!(build_prompt(&chunks, "q"), build_prompt(&chunks, "q"));
}
