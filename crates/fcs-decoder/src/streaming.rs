use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use fcs_wire::HEADER_SIZE;

use crate::config::DecodeOptions;
use crate::decoder;
use crate::document::Document;
use crate::error::{DecodeError, StreamFailure};

/// Read size used by [`decode_reader`].
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// What a [`StreamingDecoder`] wants after a call to
/// [`feed`](StreamingDecoder::feed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
  /// `needed` bytes must be buffered before the next step can run.
  NeedMore { buffered: usize, needed: usize },

  /// The document is complete. Further chunks are ignored.
  Done,

  /// A step failed. The error is reported by
  /// [`finish`](StreamingDecoder::finish).
  Failed,
}

/// Internal state machine for the streaming decoder.
///
/// ```text
///   Header ──→ Text ──┬──→ Analysis ──→ Data ──→ Done
///                     ├──→ Data ──┬──→ Analysis ──→ Done
///                     │           └──→ Done
///                     ├──→ Analysis ──→ Done      (no events requested)
///                     └──→ Done
///
///   any step error ──→ Failed
/// ```
///
/// Each state has a byte threshold: the step runs once that many bytes
/// are buffered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
  Header,
  Text,
  Analysis,
  Data,
  Done,
  Failed,
}

impl StreamState {
  fn name(self) -> &'static str {
    match self {
      Self::Header => "header",
      Self::Text => "text",
      Self::Analysis => "analysis",
      Self::Data => "data",
      Self::Done => "done",
      Self::Failed => "failed",
    }
  }
}

/// Incremental FCS decoder fed with arbitrary-sized chunks.
///
/// Runs the same steps as [`FcsDecoder`](crate::FcsDecoder), each one as
/// soon as enough bytes are buffered. The result depends only on the
/// concatenated bytes, never on where the chunk boundaries fall.
///
/// ```rust
/// use fcs_decoder::{DecodeOptions, Progress, StreamingDecoder};
/// use fcs_fixtures::FcsBuilder;
///
/// let file = FcsBuilder::new(&["FSC-A"]).events(vec![vec![1.0]]).build();
///
/// let mut decoder = StreamingDecoder::new(DecodeOptions::default());
/// for chunk in file.chunks(100) {
///     if decoder.feed(chunk) == Progress::Done {
///         break;
///     }
/// }
/// let doc = decoder.finish().unwrap();
/// assert_eq!(doc.string_row(1), Some("[1.00]"));
/// ```
///
/// A decoder that stops before `Done` hands back the partially decoded
/// document inside a [`StreamFailure`].
pub struct StreamingDecoder {
  options: DecodeOptions,
  state: StreamState,
  /// Everything received so far. Segment offsets are absolute file
  /// offsets, so nothing is dropped before `Done`.
  buf: BytesMut,
  needed: usize,
  doc: Document,
  analysis_read: bool,
  error: Option<DecodeError>,
}

impl StreamingDecoder {
  #[must_use]
  pub fn new(options: DecodeOptions) -> Self {
    let doc = Document {
      metadata: options.metadata.clone(),
      ..Document::default()
    };
    Self {
      options,
      state: StreamState::Header,
      buf: BytesMut::with_capacity(HEADER_SIZE),
      needed: HEADER_SIZE,
      doc,
      analysis_read: false,
      error: None,
    }
  }

  /// Append a chunk and run every step whose threshold is now met.
  pub fn feed(&mut self, chunk: &[u8]) -> Progress {
    if self.is_finished() {
      trace!(len = chunk.len(), state = self.state.name(), "ignoring chunk");
      return self.progress();
    }

    self.buf.extend_from_slice(chunk);
    trace!(
      len = chunk.len(),
      buffered = self.buf.len(),
      needed = self.needed,
      "received chunk"
    );

    while !self.is_finished() && self.buf.len() >= self.needed {
      if let Err(error) = self.step() {
        debug!(state = self.state.name(), %error, "streaming decode failed");
        self.error = Some(error);
        self.state = StreamState::Failed;
      }
    }

    if self.state == StreamState::Done {
      self.buf = BytesMut::new();
    }
    self.progress()
  }

  /// Run the step for the current state, whose threshold has been met.
  fn step(&mut self) -> Result<(), DecodeError> {
    let buf = &self.buf[..];
    match self.state {
      StreamState::Header => {
        self.doc.header = decoder::read_header(buf)?;
        let end_text = self.doc.header.end_text;
        self.transition(StreamState::Text, end_text);
      }
      StreamState::Text => {
        decoder::read_text(buf, &mut self.doc, &self.options)?;
        let end_analysis = self.doc.header.end_analysis;
        if self.doc.header.analysis_before_data() {
          self.transition(StreamState::Analysis, end_analysis);
        } else if decoder::events_requested(&self.doc, &self.options) {
          self.enter_data()?;
        } else if self.doc.header.has_analysis() {
          self.transition(StreamState::Analysis, end_analysis);
        } else {
          self.transition(StreamState::Done, 0);
        }
      }
      StreamState::Analysis => {
        decoder::read_analysis(buf, &mut self.doc, &self.options)?;
        self.analysis_read = true;
        if self.doc.plan.is_none() && decoder::events_requested(&self.doc, &self.options) {
          self.enter_data()?;
        } else {
          self.transition(StreamState::Done, 0);
        }
      }
      StreamState::Data => {
        decoder::read_data(buf, &mut self.doc)?;
        if self.doc.header.has_analysis() && !self.analysis_read {
          let end_analysis = self.doc.header.end_analysis;
          self.transition(StreamState::Analysis, end_analysis);
        } else {
          self.transition(StreamState::Done, 0);
        }
      }
      StreamState::Done | StreamState::Failed => {}
    }
    Ok(())
  }

  fn enter_data(&mut self) -> Result<(), DecodeError> {
    decoder::plan_data(&mut self.doc, &self.options)?;
    let begin_data = self.doc.header.begin_data;
    let needed = self
      .doc
      .plan
      .as_ref()
      .map_or(begin_data, |plan| plan.data_end(begin_data));
    self.transition(StreamState::Data, needed);
    Ok(())
  }

  fn transition(&mut self, next: StreamState, needed: usize) {
    debug!(
      from = self.state.name(),
      to = next.name(),
      needed,
      buffered = self.buf.len(),
      "state transition"
    );
    self.state = next;
    self.needed = needed;
  }

  fn is_finished(&self) -> bool {
    matches!(self.state, StreamState::Done | StreamState::Failed)
  }

  fn progress(&self) -> Progress {
    match self.state {
      StreamState::Done => Progress::Done,
      StreamState::Failed => Progress::Failed,
      _ => Progress::NeedMore {
        buffered: self.buf.len(),
        needed: self.needed,
      },
    }
  }

  /// Name of the current state (`header`, `text`, `analysis`, `data`,
  /// `done`, `failed`).
  #[must_use]
  pub fn state(&self) -> &'static str {
    self.state.name()
  }

  #[must_use]
  pub fn is_done(&self) -> bool {
    self.state == StreamState::Done
  }

  /// Bytes buffered so far. Drops to 0 once the document is complete.
  #[must_use]
  pub fn buffered(&self) -> usize {
    self.buf.len()
  }

  /// Byte threshold of the next step.
  #[must_use]
  pub fn needed(&self) -> usize {
    self.needed
  }

  /// The document as decoded so far.
  #[must_use]
  pub fn document(&self) -> &Document {
    &self.doc
  }

  /// The source signalled end of data.
  ///
  /// # Errors
  ///
  /// The stored step error if one occurred, otherwise
  /// [`DecodeError::StreamEndedEarly`] if the decoder is not done.
  pub fn finish(self) -> Result<Document, StreamFailure> {
    self.conclude(|state, buffered, needed| DecodeError::StreamEndedEarly {
      state,
      buffered,
      needed,
    })
  }

  /// The source was closed by its owner.
  ///
  /// # Errors
  ///
  /// The stored step error if one occurred, otherwise
  /// [`DecodeError::StreamClosedEarly`] if the decoder is not done.
  pub fn close(self) -> Result<Document, StreamFailure> {
    self.conclude(|state, buffered, needed| DecodeError::StreamClosedEarly {
      state,
      buffered,
      needed,
    })
  }

  /// The source failed with an I/O error.
  ///
  /// A decoder that is already done keeps its document; one that already
  /// failed reports its first error.
  ///
  /// # Errors
  ///
  /// [`DecodeError::Io`] carrying `error`, or the stored step error.
  pub fn abort(self, error: std::io::Error) -> Result<Document, StreamFailure> {
    self.conclude(|_, _, _| DecodeError::Io(error))
  }

  fn conclude(
    self,
    early: impl FnOnce(&'static str, usize, usize) -> DecodeError,
  ) -> Result<Document, StreamFailure> {
    let error = match (self.state, self.error) {
      (StreamState::Done, _) => return Ok(self.doc),
      (_, Some(error)) => error,
      (state, None) => early(state.name(), self.buf.len(), self.needed),
    };
    Err(StreamFailure {
      error,
      partial: Box::new(self.doc),
    })
  }
}

/// Decode an FCS file from an async byte source.
///
/// Reads in chunks of [`READ_CHUNK_SIZE`] bytes and stops reading as soon
/// as the document is complete, so trailing bytes (a CRC, another data
/// set) are never pulled from the source.
///
/// # Errors
///
/// [`StreamFailure`] with the partial document if a step fails, the source
/// ends before the document is complete, or a read fails.
pub async fn decode_reader<R>(mut reader: R, options: DecodeOptions) -> Result<Document, StreamFailure>
where
  R: AsyncRead + Unpin,
{
  let mut decoder = StreamingDecoder::new(options);
  let mut chunk = vec![0u8; READ_CHUNK_SIZE];

  loop {
    let n = match reader.read(&mut chunk).await {
      Ok(n) => n,
      Err(error) => return decoder.abort(error),
    };
    if n == 0 {
      return decoder.finish();
    }
    match decoder.feed(&chunk[..n]) {
      Progress::NeedMore { .. } => {}
      Progress::Done | Progress::Failed => return decoder.finish(),
    }
  }
}
