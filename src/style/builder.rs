use crate::error::Result;
use crate::style::descriptor::{StyleDescriptor, StyleRequest};

/// Chained construction of a `StyleDescriptor`
///
/// ```
/// use sonora::style::StyleBuilder;
///
/// let style = StyleBuilder::new("rock")
///     .tempo(150)
///     .instrument("guitar")
///     .duration_secs(5.0)
///     .build()
///     .unwrap();
/// assert_eq!(style.tempo(), 150);
/// ```
#[derive(Debug, Clone)]
pub struct StyleBuilder {
    request: StyleRequest,
}

impl StyleBuilder {
    pub fn new(genre: impl Into<String>) -> Self {
        StyleBuilder {
            request: StyleRequest::new(genre),
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.request.genre = genre.into();
        self
    }

    pub fn tempo(mut self, tempo: u32) -> Self {
        self.request.tempo = tempo;
        self
    }

    /// Append one instrument
    pub fn instrument(mut self, instrument: impl Into<String>) -> Self {
        self.request.instrumentation.push(instrument.into());
        self
    }

    /// Replace the whole instrument list
    pub fn instrumentation<I, S>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.instrumentation = instruments.into_iter().map(Into::into).collect();
        self
    }

    pub fn duration_secs(mut self, duration_secs: f64) -> Self {
        self.request.duration_secs = duration_secs;
        self
    }

    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.request.container = container.into();
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<StyleDescriptor> {
        StyleDescriptor::try_from(self.request)
    }
}
