use backtrace::{Backtrace, BacktraceFrame, BacktraceSymbol};
use errx_core::{Classification, Error, Frame, StackSource, Traced};
use tracing::debug;

/// Frames kept by [`here`].
pub const DEFAULT_MAX_FRAMES: usize = 32;

/// Leading frames from these paths belong to the capture itself.
const INTERNAL_PREFIXES: &[&str] = &["backtrace::", "errx_stack::capture::"];

/// Extra raw frames recorded to cover the capture's own frames, which are
/// only recognised once symbols are resolved.
const INTERNAL_FRAME_SLACK: usize = 16;

#[derive(Debug)]
struct BacktraceSource {
    backtrace: Backtrace,
    max_frames: usize,
}

impl StackSource for BacktraceSource {
    fn resolve(&self) -> Vec<Frame> {
        let mut backtrace = self.backtrace.clone();
        backtrace.resolve();

        let frames: Vec<Frame> = backtrace
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .map(to_frame)
            .skip_while(is_internal)
            .take(self.max_frames)
            .collect();

        debug!(
            frames = frames.len(),
            max_frames = self.max_frames,
            "resolved stack trace"
        );
        frames
    }
}

fn to_frame(symbol: &BacktraceSymbol) -> Frame {
    let file = symbol
        .filename()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    let function = symbol
        .name()
        .map(|name| format!("{name:#}"))
        .unwrap_or_else(|| "<unknown>".to_string());
    Frame::new(file, symbol.lineno().unwrap_or(0), function)
}

fn is_internal(frame: &Frame) -> bool {
    INTERNAL_PREFIXES
        .iter()
        .any(|prefix| frame.function.starts_with(prefix))
}

/// Unresolved snapshot of at most `max_frames` caller frames plus slack.
#[inline(never)]
fn snapshot(max_frames: usize) -> Backtrace {
    if max_frames == 0 {
        return Backtrace::from(Vec::<BacktraceFrame>::new());
    }
    let budget = max_frames.saturating_add(INTERNAL_FRAME_SLACK);
    let mut frames: Vec<BacktraceFrame> = Vec::with_capacity(budget);
    backtrace::trace(|frame| {
        frames.push(BacktraceFrame::from(frame.clone()));
        frames.len() < budget
    });
    Backtrace::from(frames)
}

#[inline(never)]
fn capture(max_frames: usize) -> Traced {
    debug!(max_frames, "capturing stack trace");
    Traced::deferred(BacktraceSource {
        backtrace: snapshot(max_frames),
        max_frames,
    })
}

/// Capture the caller's stack, keeping at most [`DEFAULT_MAX_FRAMES`] frames.
#[inline(never)]
pub fn here() -> Traced {
    capture(DEFAULT_MAX_FRAMES)
}

/// Capture the caller's stack, keeping at most `max_frames` frames.
#[inline(never)]
pub fn here_with_depth(max_frames: usize) -> Traced {
    capture(max_frames)
}

/// [`errx_core::wrap`] plus a trace of the caller's stack.
///
/// Nothing is captured when `cause` is missing.
#[inline(never)]
pub fn wrap<C>(
    text: impl Into<String>,
    cause: impl Into<Option<Error>>,
    classifications: impl IntoIterator<Item = C>,
) -> Option<Error>
where
    C: Into<Classification>,
{
    let cause = cause.into()?;
    let classifications = with_trace(classifications);
    Some(cause.wrap(text, classifications))
}

/// [`errx_core::classify`] plus a trace of the caller's stack.
///
/// Nothing is captured when `cause` is missing.
#[inline(never)]
pub fn classify<C>(
    cause: impl Into<Option<Error>>,
    classifications: impl IntoIterator<Item = C>,
) -> Option<Error>
where
    C: Into<Classification>,
{
    let cause = cause.into()?;
    let classifications = with_trace(classifications);
    Some(cause.classify(classifications))
}

#[inline(never)]
fn with_trace<C>(classifications: impl IntoIterator<Item = C>) -> Vec<Classification>
where
    C: Into<Classification>,
{
    let mut all: Vec<Classification> = classifications.into_iter().map(Into::into).collect();
    all.push(capture(DEFAULT_MAX_FRAMES).into());
    all
}

/// Frames of the first trace attached to `err`.
pub fn extract<'a>(err: impl Into<Option<&'a Error>>) -> Option<&'a [Frame]> {
    errx_core::frames(err)
}
