use keypace::metrics::{accuracy, wpm};
use keypace::segmenter::{normalize_whitespace, segment};
use keypace::session::{SessionConfig, SessionEvent, SessionStatus, StatsSnapshot, TypingSession};
use keypace::timer::TimeLimit;

const WALDEN: &str = "I went to the woods because I wished to live deliberately, \
    to front only the essential facts of life, and see if I could not learn what it had \
    to teach, and not, when I came to die, discover that I had not lived.";

fn completions(session: &mut TypingSession) -> usize {
    session
        .drain_events()
        .iter()
        .filter(|e| matches!(e, SessionEvent::Complete(_)))
        .count()
}

#[test]
fn accuracy_stays_in_range() {
    for total in 0..40usize {
        for correct in 0..=total {
            assert!(accuracy(correct, total) <= 100);
        }
    }
    assert_eq!(accuracy(0, 0), 100);
}

#[test]
fn wpm_is_zero_without_elapsed_time() {
    for correct in [0, 1, 5, 1_000] {
        assert_eq!(wpm(correct, 0), 0);
    }
}

#[test]
fn segmentation_preserves_word_sequence() {
    let original: Vec<&str> = WALDEN.split_whitespace().collect();
    for capacity in [1, 7, 20, 64, 500] {
        let joined = segment(WALDEN, capacity).join(" ");
        let words: Vec<&str> = joined.split_whitespace().collect();
        assert_eq!(words, original, "capacity {capacity}");
    }
    assert_eq!(
        normalize_whitespace(&segment(WALDEN, 30).join(" ")),
        normalize_whitespace(WALDEN)
    );
}

#[test]
fn abd_against_abc() {
    let mut session = TypingSession::new("abc", SessionConfig::default());
    session.submit_input("abd");
    let stats = session.stats();

    assert!(session.is_finished());
    assert_eq!(stats.correct_chars, 2);
    assert_eq!(stats.incorrect_chars, 1);
    assert_eq!(stats.total_chars, 3);
    assert_eq!(stats.accuracy, 67);
}

#[test]
fn one_second_limit_finishes_after_one_tick() {
    let config = SessionConfig {
        time_limit: TimeLimit::seconds(1),
        ..SessionConfig::default()
    };
    let mut session = TypingSession::new("never typed", config);
    assert!(session.start());
    session.tick();

    assert_eq!(session.status(), SessionStatus::Finished);
    assert_eq!(session.remaining_secs(), Some(0));
    assert_eq!(completions(&mut session), 1);

    session.tick();
    session.submit_input("n");
    assert_eq!(completions(&mut session), 0);
}

#[test]
fn pause_freezes_the_clock() {
    let config = SessionConfig {
        time_limit: TimeLimit::seconds(10),
        ..SessionConfig::default()
    };
    let mut session = TypingSession::new("hello", config);
    session.submit_input("h");
    session.tick();
    session.pause();

    for _ in 0..5 {
        session.tick();
    }
    assert_eq!(session.elapsed_secs(), 1);
    assert_eq!(session.remaining_secs(), Some(9));

    session.resume();
    session.tick();
    assert_eq!(session.elapsed_secs(), 2);
    assert_eq!(session.remaining_secs(), Some(8));
}

#[test]
fn reset_from_every_state() {
    let mut running = TypingSession::new("one two three", SessionConfig::default());
    running.submit_input("one");

    let mut paused = running.clone();
    paused.pause();

    let mut finished = TypingSession::new("x", SessionConfig::default());
    finished.submit_input("x");
    assert!(finished.is_finished());

    let idle = TypingSession::new("idle", SessionConfig::default());

    for mut session in [idle, running, paused, finished] {
        session.reset();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.typed_text(), "");
        assert_eq!(session.current_paragraph_index(), 0);
        assert_eq!(session.stats(), StatsSnapshot::default());
        assert_eq!(session.elapsed_secs(), 0);
    }
}

#[test]
fn overflow_counts_as_incorrect() {
    let config = SessionConfig {
        paragraph_capacity: 3,
        ..SessionConfig::default()
    };
    let mut session = TypingSession::new("ab cd", config);
    assert_eq!(session.paragraphs(), ["ab", "cd"]);

    session.submit_input("abzz");
    let stats = session.stats();
    assert_eq!(stats.correct_chars, 2);
    assert_eq!(stats.incorrect_chars, 2);
    assert_eq!(stats.total_chars, 4);
    assert_eq!(session.current_paragraph_index(), 1);
}

#[test]
fn empty_text_finishes_on_first_input() {
    let mut session = TypingSession::new("", SessionConfig::default());
    assert_eq!(session.paragraphs(), [""]);
    session.submit_input("a");
    assert!(session.is_finished());
    assert_eq!(completions(&mut session), 1);
}

#[test]
fn negative_limit_is_unlimited() {
    let config = SessionConfig {
        time_limit: TimeLimit::from_secs(-30),
        ..SessionConfig::default()
    };
    let mut session = TypingSession::new("hello", config);
    session.submit_input("h");
    for _ in 0..120 {
        session.tick();
    }
    assert_eq!(session.status(), SessionStatus::Running);
    assert_eq!(session.remaining_secs(), None);
    assert_eq!(session.elapsed_secs(), 120);
}
