use std::io::Write;

pub const SPEECH_LANGUAGE: &str = "ko-KR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Success,
    Failure,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech synthesis is not supported here")]
    Unsupported,
}

/// What the quiz needs from its host to talk back to the user.
pub trait Feedback {
    /// Fire-and-forget. Playback problems are the host's to swallow.
    fn play(&self, cue: Cue);

    fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError>;

    fn show(&self, text: &str);
}

/// Plain stdout host. It can ring the bell but has no voice.
#[derive(Debug, Default)]
pub struct TerminalFeedback;

impl Feedback for TerminalFeedback {
    fn play(&self, cue: Cue) {
        log::debug!("Playing {:?} cue", cue);
        let mut stdout = std::io::stdout();
        let _ = match cue {
            Cue::Success => write!(stdout, "\x07"),
            Cue::Failure => write!(stdout, "\x07\x07"),
        };
        let _ = stdout.flush();
    }

    fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
        log::debug!("Cannot speak {:?} ({}) on a terminal", text, language);
        Err(SpeechError::Unsupported)
    }

    fn show(&self, text: &str) {
        println!("{}", text);
    }
}
