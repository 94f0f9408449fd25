use std::borrow::Cow;

use crate::config::TrackDisplayField;

use super::model::Track;

impl Track {
    fn field_text(&self, field: TrackDisplayField) -> Option<Cow<'_, str>> {
        let text = match field {
            TrackDisplayField::Title => Cow::Borrowed(self.title.trim()),
            TrackDisplayField::Artist => Cow::Borrowed(self.artist.as_deref()?.trim()),
            TrackDisplayField::Album => Cow::Borrowed(self.album.as_deref()?.trim()),
            TrackDisplayField::Filename => Cow::Borrowed(self.path.file_stem()?.to_str()?.trim()),
            TrackDisplayField::Path => Cow::Owned(self.path.display().to_string()),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Join the configured fields with `sep`. A track that has none of them
    /// shows its title.
    pub fn compose_display(&self, fields: &[TrackDisplayField], sep: &str) -> String {
        let parts: Vec<Cow<'_, str>> = fields.iter().filter_map(|f| self.field_text(*f)).collect();
        if parts.is_empty() {
            self.title.clone()
        } else {
            parts.join(sep)
        }
    }
}
