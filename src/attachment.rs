use crate::board::Attachment;

/// Audio suffixes the pipeline accepts
pub const AUDIO_EXTENSIONS: [&str; 2] = [".mp3", ".wav"];

/// Result of inspecting a card's attachments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentCheck {
    /// The card has no attachments at all
    NoAttachments,
    /// The card has attachments but none is usable audio
    NoneValid,
    /// Usable audio attachments, in their original order
    Valid(Vec<Attachment>),
}

impl AttachmentCheck {
    /// First usable attachment, the one a job processes
    pub fn first(&self) -> Option<&Attachment> {
        match self {
            AttachmentCheck::Valid(valid) => valid.first(),
            _ => None,
        }
    }
}

/// An attachment is usable iff its file name ends in `.mp3` or `.wav`
pub fn is_valid(attachment: &Attachment) -> bool {
    attachment
        .file_name
        .as_deref()
        .is_some_and(|name| AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
}

/// Classify a card's attachments
pub fn validate_attachments(attachments: &[Attachment]) -> AttachmentCheck {
    if attachments.is_empty() {
        return AttachmentCheck::NoAttachments;
    }

    let valid: Vec<Attachment> = attachments.iter().filter(|a| is_valid(a)).cloned().collect();

    if valid.is_empty() {
        AttachmentCheck::NoneValid
    } else {
        AttachmentCheck::Valid(valid)
    }
}
