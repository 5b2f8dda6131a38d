//! Encodings exposed by a stream resolver and the "best" selection rules.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingKind {
    AudioOnly,
    VideoOnly,
    Muxed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub id: u32,
    pub kind: EncodingKind,
    pub mime_type: String,
    pub bitrate: u64,
    pub height: Option<u32>,
    pub audio_sample_rate: Option<u32>,
}

impl Encoding {
    /// Extension derived from the container subtype, e.g. `audio/webm; codecs="opus"` → `webm`.
    pub fn file_extension(&self) -> &str {
        let essence = self.mime_type.split(';').next().unwrap_or_default().trim();
        match essence.split_once('/') {
            Some((_, "3gpp")) => "3gp",
            Some((_, subtype)) if !subtype.is_empty() => subtype,
            _ => "bin",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EncodingSet {
    encodings: Vec<Encoding>,
}

impl EncodingSet {
    pub fn new(encodings: Vec<Encoding>) -> Self {
        Self { encodings }
    }

    pub fn len(&self) -> usize {
        self.encodings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encodings.is_empty()
    }

    pub fn of_kind(&self, kind: EncodingKind) -> Self {
        Self::new(self.encodings.iter().filter(|e| e.kind == kind).cloned().collect())
    }

    pub fn audio_only(&self) -> Self {
        self.of_kind(EncodingKind::AudioOnly)
    }

    pub fn video_only(&self) -> Self {
        self.of_kind(EncodingKind::VideoOnly)
    }

    pub fn muxed(&self) -> Self {
        self.of_kind(EncodingKind::Muxed)
    }

    /// Highest sample rate, ties broken by bitrate.
    pub fn best_audio(&self) -> Option<&Encoding> {
        self.encodings
            .iter()
            .filter(|e| e.kind != EncodingKind::VideoOnly)
            .max_by_key(|e| (e.audio_sample_rate.unwrap_or(0), e.bitrate))
    }

    /// Tallest picture, ties broken by bitrate.
    pub fn best_video(&self) -> Option<&Encoding> {
        self.encodings
            .iter()
            .filter(|e| e.kind != EncodingKind::AudioOnly)
            .max_by_key(|e| (e.height.unwrap_or(0), e.bitrate))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Encoding> {
        self.encodings.iter()
    }
}
