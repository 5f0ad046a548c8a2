//! History trimming — bounds the conversation echoed back to callers.
//!
//! Messages are grouped into pairs: a run of consecutive messages closed by
//! an assistant message. Only the last few complete pairs are kept.

use ragloop_core::message::{Message, Role};

/// Completed exchanges kept by default.
pub const MAX_HISTORY_PAIRS: usize = 3;

/// Keep the last `max_pairs` pairs of `messages`, in order.
///
/// A trailing run with no closing assistant message is not a pair and is
/// dropped. Pairs may hold more than two messages.
pub fn trim_history(messages: &[Message], max_pairs: usize) -> Vec<Message> {
    let mut pairs: Vec<&[Message]> = Vec::new();
    let mut start = 0;

    for (i, message) in messages.iter().enumerate() {
        if message.role == Role::Assistant {
            pairs.push(&messages[start..=i]);
            start = i + 1;
        }
    }

    let skip = pairs.len().saturating_sub(max_pairs);
    pairs[skip..].iter().flat_map(|pair| pair.iter().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> Vec<Message> {
        (0..n)
            .flat_map(|i| {
                [
                    Message::user(format!("question {i}")),
                    Message::assistant(format!("answer {i}")),
                ]
            })
            .collect()
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn keeps_last_three_of_four() {
        let trimmed = trim_history(&exchange(4), MAX_HISTORY_PAIRS);
        assert_eq!(
            contents(&trimmed),
            vec!["question 1", "answer 1", "question 2", "answer 2", "question 3", "answer 3"]
        );
    }

    #[test]
    fn pair_counts_zero_through_seven() {
        for n in 0..8 {
            let trimmed = trim_history(&exchange(n), MAX_HISTORY_PAIRS);
            assert_eq!(trimmed.len(), 2 * n.min(3), "n = {n}");
            if n > 0 {
                assert_eq!(trimmed.last().unwrap().content, format!("answer {}", n - 1));
            }
        }
    }

    #[test]
    fn trimming_is_idempotent() {
        let once = trim_history(&exchange(6), MAX_HISTORY_PAIRS);
        let twice = trim_history(&once, MAX_HISTORY_PAIRS);
        assert_eq!(once, twice);
    }

    #[test]
    fn trailing_unanswered_messages_are_dropped() {
        let mut messages = exchange(2);
        messages.push(Message::user("still waiting"));
        let trimmed = trim_history(&messages, MAX_HISTORY_PAIRS);
        assert_eq!(trimmed, exchange(2));
    }

    #[test]
    fn pairs_may_span_several_messages() {
        let messages = vec![
            Message::user("first"),
            Message::user("second"),
            Message::assistant("reply a"),
            Message::user("third"),
            Message::tool_result("call_1", "context"),
            Message::assistant("reply b"),
        ];
        let trimmed = trim_history(&messages, 1);
        assert_eq!(contents(&trimmed), vec!["third", "context", "reply b"]);

        let all = trim_history(&messages, MAX_HISTORY_PAIRS);
        assert_eq!(all, messages);
    }

    #[test]
    fn consecutive_assistant_messages_are_separate_pairs() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant("one"),
            Message::assistant("two"),
        ];
        let trimmed = trim_history(&messages, 1);
        assert_eq!(contents(&trimmed), vec!["two"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(trim_history(&[], MAX_HISTORY_PAIRS).is_empty());
        assert!(trim_history(&exchange(2), 0).is_empty());
    }

    #[test]
    fn output_never_longer_than_input() {
        for n in 0..6 {
            let mut messages = exchange(n);
            messages.push(Message::user("tail"));
            assert!(trim_history(&messages, MAX_HISTORY_PAIRS).len() <= messages.len());
        }
    }
}
