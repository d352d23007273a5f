use super::Concept;
use crate::status::Status;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A rectangular region of an image, as fractions of its height and width (`0.0..=1.0`).
///
/// On the wire a crop appears either as a `bounding_box` object (regions) or as a
/// `[top, left, bottom, right]` array (image crops).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    #[serde(rename = "top_row", default)]
    pub top: f32,
    #[serde(rename = "left_col", default)]
    pub left: f32,
    #[serde(rename = "bottom_row", default)]
    pub bottom: f32,
    #[serde(rename = "right_col", default)]
    pub right: f32,
}

impl Crop {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub(crate) fn to_array(self) -> Vec<f32> {
        vec![self.top, self.left, self.bottom, self.right]
    }

    pub(crate) fn from_slice(values: &[f32]) -> Option<Self> {
        match *values {
            [top, left, bottom, right] => Some(Self::new(top, left, bottom, right)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub longitude: f32,
    #[serde(default)]
    pub latitude: f32,
}

impl GeoPoint {
    pub fn new(longitude: f32, latitude: f32) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Where the media bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    Url(String),
    /// Raw file contents, sent base64-encoded.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub source: MediaSource,
    /// Only meaningful for images; videos are never cropped.
    pub crop: Option<Crop>,
    pub allow_duplicate_url: bool,
}

impl MediaFile {
    fn new(source: MediaSource) -> Self {
        Self {
            source,
            crop: None,
            allow_duplicate_url: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    Image(MediaFile),
    Video(MediaFile),
}

impl Media {
    pub fn file(&self) -> &MediaFile {
        match self {
            Media::Image(file) | Media::Video(file) => file,
        }
    }

    fn file_mut(&mut self) -> &mut MediaFile {
        match self {
            Media::Image(file) | Media::Video(file) => file,
        }
    }
}

/// A media item stored in (or sent to) the application, with its annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireInput", try_from = "WireInput")]
pub struct Input {
    pub id: Option<String>,
    pub media: Option<Media>,
    pub concepts: Vec<Concept>,
    pub metadata: Option<Map<String, Value>>,
    pub geo: Option<GeoPoint>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: Option<Status>,
}

impl Input {
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::with_media(Media::Image(MediaFile::new(MediaSource::Url(url.into()))))
    }

    pub fn image_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_media(Media::Image(MediaFile::new(MediaSource::Bytes(bytes.into()))))
    }

    pub fn video_url(url: impl Into<String>) -> Self {
        Self::with_media(Media::Video(MediaFile::new(MediaSource::Url(url.into()))))
    }

    pub fn video_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_media(Media::Video(MediaFile::new(MediaSource::Bytes(bytes.into()))))
    }

    /// References an input that already exists in the application.
    pub fn existing(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    fn with_media(media: Media) -> Self {
        Self {
            media: Some(media),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_crop(mut self, crop: Crop) -> Self {
        if let Some(media) = self.media.as_mut() {
            media.file_mut().crop = Some(crop);
        }
        self
    }

    pub fn allow_duplicate_url(mut self, allow: bool) -> Self {
        if let Some(media) = self.media.as_mut() {
            media.file_mut().allow_duplicate_url = allow;
        }
        self
    }

    pub fn with_concepts(mut self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        self.concepts.extend(concepts);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_geo(mut self, geo: GeoPoint) -> Self {
        self.geo = Some(geo);
        self
    }
}

/// Processing counters of the application's inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputCount {
    pub processed: u32,
    pub to_process: u32,
    pub errors: u32,
    pub processing: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WireMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) crop: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub(crate) allow_duplicate_url: bool,
}

impl WireMedia {
    pub(crate) fn from_source(source: &MediaSource) -> Self {
        match source {
            MediaSource::Url(url) => Self {
                url: Some(url.clone()),
                ..Default::default()
            },
            MediaSource::Bytes(bytes) => Self {
                base64: Some(STANDARD.encode(bytes)),
                ..Default::default()
            },
        }
    }

    fn into_file(self) -> Result<MediaFile, String> {
        let source = match (self.url, self.base64) {
            (_, Some(encoded)) if !encoded.is_empty() => MediaSource::Bytes(
                STANDARD
                    .decode(encoded)
                    .map_err(|e| format!("invalid base64 media: {e}"))?,
            ),
            (Some(url), _) => MediaSource::Url(url),
            _ => MediaSource::Url(String::new()),
        };

        let crop = match self.crop {
            Some(values) if !values.is_empty() => Some(
                Crop::from_slice(&values)
                    .ok_or_else(|| format!("crop needs 4 values, got {}", values.len()))?,
            ),
            _ => None,
        };

        Ok(MediaFile {
            source,
            crop,
            allow_duplicate_url: self.allow_duplicate_url,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireGeo {
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_point: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireData {
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<WireMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<WireMedia>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    concepts: Vec<Concept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo: Option<WireGeo>,
}

impl WireData {
    fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.video.is_none()
            && self.concepts.is_empty()
            && self.metadata.is_none()
            && self.geo.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "WireData::is_empty")]
    data: WireData,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

impl From<Input> for WireInput {
    fn from(input: Input) -> Self {
        let (image, video) = match &input.media {
            Some(Media::Image(file)) => {
                let mut wire = WireMedia::from_source(&file.source);
                wire.crop = file.crop.map(Crop::to_array);
                wire.allow_duplicate_url = file.allow_duplicate_url;
                (Some(wire), None)
            }
            Some(Media::Video(file)) => {
                let mut wire = WireMedia::from_source(&file.source);
                wire.allow_duplicate_url = file.allow_duplicate_url;
                (None, Some(wire))
            }
            None => (None, None),
        };

        Self {
            id: input.id,
            data: WireData {
                image,
                video,
                concepts: input.concepts,
                metadata: input.metadata,
                geo: input.geo.map(|point| WireGeo {
                    geo_point: Some(point),
                }),
            },
            created_at: input.created_at,
            status: input.status,
        }
    }
}

impl TryFrom<WireInput> for Input {
    type Error = String;

    fn try_from(wire: WireInput) -> Result<Self, Self::Error> {
        let media = match (wire.data.image, wire.data.video) {
            (Some(image), _) => Some(Media::Image(image.into_file()?)),
            (None, Some(video)) => Some(Media::Video(video.into_file()?)),
            (None, None) => None,
        };

        Ok(Self {
            id: wire.id.filter(|id| !id.is_empty()),
            media,
            concepts: wire.data.concepts,
            metadata: wire.data.metadata,
            geo: wire.data.geo.and_then(|geo| geo.geo_point),
            created_at: wire.created_at,
            status: wire.status,
        })
    }
}
