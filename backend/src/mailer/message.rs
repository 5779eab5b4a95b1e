use crate::error::MailerError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use shared::report::{Block, ReportLayout};

pub struct Envelope<'a> {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: &'a str,
}

pub struct PdfAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq)]
pub struct ImageAttachment {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Builds `multipart/mixed`: the text/HTML alternative, the PDF, then the
/// smear image when one was supplied.
pub fn compose(
    envelope: Envelope<'_>,
    layout: &ReportLayout,
    pdf: PdfAttachment,
    image: Option<ImageAttachment>,
) -> Result<Message, MailerError> {
    let pdf_type = content_type("application/pdf")?;
    let mut body = MultiPart::mixed()
        .multipart(MultiPart::alternative_plain_html(plain_body(layout), html_body(layout)))
        .singlepart(Attachment::new(pdf.filename).body(pdf.bytes, pdf_type));

    if let Some(image) = image {
        let image_type = content_type(image.mime_type)?;
        body = body.singlepart(Attachment::new(image.filename).body(image.bytes, image_type));
    }

    Message::builder()
        .from(envelope.from)
        .to(envelope.to)
        .subject(envelope.subject)
        .multipart(body)
        .map_err(|e| MailerError::Internal(format!("Failed to build email: {}", e)))
}

fn content_type(value: &str) -> Result<ContentType, MailerError> {
    ContentType::parse(value).map_err(|e| MailerError::Internal(format!("Bad content type {}: {}", value, e)))
}

fn plain_body(layout: &ReportLayout) -> String {
    let mut lines = Vec::new();
    for block in &layout.blocks {
        match block {
            Block::Title { title, .. } => lines.push(format!("{}\n", title)),
            Block::Section(heading) => lines.push(format!("\n{}", heading)),
            Block::Field { label, value } => lines.push(format!("{}: {}", label, value)),
            Block::Classification { label, .. } => lines.push(format!("Classification: {}", label)),
            Block::Confidence(percent) => lines.push(format!("Confidence: {}", percent)),
            Block::Interpretation(text) => lines.push(text.clone()),
            Block::Probability { label, percent } => lines.push(format!("  {}: {}", label, percent)),
            Block::Timestamp(text) => lines.push(format!("\n{}", text)),
            Block::Disclaimer(text) => lines.push(format!("\n{}", text)),
        }
    }
    lines.push("\nThe full report is attached as a PDF.".to_string());
    lines.join("\n")
}

fn html_body(layout: &ReportLayout) -> String {
    let mut html = String::from("<html><body style=\"font-family: Arial, sans-serif; color: #222;\">");
    let mut in_table = false;

    for block in &layout.blocks {
        let is_row = matches!(block, Block::Field { .. } | Block::Probability { .. });
        if in_table && !is_row {
            html.push_str("</table>");
            in_table = false;
        }
        if is_row && !in_table {
            html.push_str("<table cellpadding=\"4\">");
            in_table = true;
        }

        match block {
            Block::Title { title, subtitle } => html.push_str(&format!(
                "<h1>{}</h1><p style=\"color: #666;\">{}</p>",
                escape_html(title),
                escape_html(subtitle)
            )),
            Block::Section(heading) => html.push_str(&format!("<h2>{}</h2>", escape_html(heading))),
            Block::Field { label, value } => html.push_str(&format!(
                "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
                escape_html(label),
                escape_html(value)
            )),
            Block::Classification { label, tone } => {
                let (r, g, b) = tone.rgb();
                html.push_str(&format!(
                    "<p style=\"font-size: 20px; font-weight: bold; color: rgb({}, {}, {});\">{}</p>",
                    channel(r),
                    channel(g),
                    channel(b),
                    escape_html(label)
                ));
            }
            Block::Confidence(percent) => {
                html.push_str(&format!("<p><strong>Confidence:</strong> {}</p>", escape_html(percent)))
            }
            Block::Interpretation(text) => html.push_str(&format!("<p>{}</p>", escape_html(text))),
            Block::Probability { label, percent } => html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(label),
                escape_html(percent)
            )),
            Block::Timestamp(text) => {
                html.push_str(&format!("<p style=\"color: #666;\">{}</p>", escape_html(text)))
            }
            Block::Disclaimer(text) => html.push_str(&format!(
                "<p style=\"font-size: 12px; color: #666; border-top: 1px solid #ccc; padding-top: 8px;\">{}</p>",
                escape_html(text)
            )),
        }
    }
    if in_table {
        html.push_str("</table>");
    }
    html.push_str("<p>The full report is attached as a PDF.</p></body></html>");
    html
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Accepts a `data:<mime>;base64,<payload>` URI or bare base64. The format is
/// sniffed from the decoded bytes, not taken from the URI.
pub fn decode_image(data: &str) -> Option<ImageAttachment> {
    let payload = match data.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => payload,
        Some(_) => return None,
        None => data,
    };
    let bytes = STANDARD.decode(payload.trim()).ok()?;

    let (mime_type, extension) = match image::guess_format(&bytes).ok()? {
        ImageFormat::Png => ("image/png", "png"),
        ImageFormat::Jpeg => ("image/jpeg", "jpg"),
        ImageFormat::Bmp => ("image/bmp", "bmp"),
        _ => return None,
    };

    Some(ImageAttachment {
        filename: format!("blood-smear.{}", extension),
        mime_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::report::FallbackMode;
    use shared::{PatientInfo, PredictionResult};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn layout(name: &str) -> ReportLayout {
        let patient = PatientInfo {
            name: name.into(),
            email: "jane@example.com".into(),
            ..PatientInfo::default()
        };
        let prediction = PredictionResult {
            prediction: "Normal".into(),
            confidence: 0.81,
            probabilities: None,
        };
        let at = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap().and_hms_opt(8, 0, 0).unwrap();
        ReportLayout::build(&patient, &prediction, FallbackMode::Lenient, at)
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(escape_html("O'Neil"), "O&#39;Neil");
    }

    #[test]
    fn html_body_escapes_patient_name() {
        let html = html_body(&layout("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("81.0%"));
        assert!(html.contains("Normal"));
    }

    #[test]
    fn plain_body_uses_lenient_fallbacks() {
        let text = plain_body(&layout("Jane Doe"));
        assert!(text.contains("Name: Jane Doe"));
        assert!(text.contains("Age: N/A"));
        assert!(text.contains("Gender: Unknown"));
        assert!(text.contains("Confidence: 81.0%"));
    }

    #[test]
    fn decodes_png_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(PNG_SIGNATURE));
        let image = decode_image(&uri).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.filename, "blood-smear.png");
        assert_eq!(image.bytes, PNG_SIGNATURE);
    }

    #[test]
    fn sniffs_format_over_declared_type() {
        let uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(PNG_SIGNATURE));
        assert_eq!(decode_image(&uri).unwrap().mime_type, "image/png");
    }

    #[test]
    fn rejects_garbage_and_unknown_formats() {
        assert!(decode_image("data:image/png;base64,!!!not base64!!!").is_none());
        assert!(decode_image(&format!("data:text/plain;base64,{}", STANDARD.encode("hello"))).is_none());
        assert!(decode_image("https://example.com/a.png,whatever").is_none());
    }

    #[test]
    fn composes_mixed_message_with_attachments() {
        let message = compose(
            Envelope {
                from: "Reports <reports@example.com>".parse().unwrap(),
                to: "jane@example.com".parse().unwrap(),
                subject: "Your report",
            },
            &layout("Jane Doe"),
            PdfAttachment {
                filename: "report.pdf".into(),
                bytes: b"%PDF-1.3".to_vec(),
            },
            Some(ImageAttachment {
                filename: "blood-smear.png".into(),
                mime_type: "image/png",
                bytes: PNG_SIGNATURE.to_vec(),
            }),
        )
        .unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("image/png"));
        assert!(raw.contains("Subject: Your report"));
    }
}
