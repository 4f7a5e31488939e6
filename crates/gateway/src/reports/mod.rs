//! Report rendering and delivery
//!
//! The gateway owns the HTTP contract of the report endpoints; the heavy
//! lifting sits behind two seams. `ReportRenderer` produces the PDF bytes
//! and `Mailer` hands them to the outbound mail relay.

use async_trait::async_trait;
use lexhub_common::{
    config::ReportConfig,
    db::models::Word,
    errors::{AppError, Result},
    search::WordStatus,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::time::Duration;

/// Which editorial report is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Words in the `redacted` state
    Redactadas,
    /// Words in the `reviewed` state
    Revisadas,
    /// The whole dictionary regardless of state
    Completo,
}

impl ReportKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "redactadas" => Some(ReportKind::Redactadas),
            "revisadas" => Some(ReportKind::Revisadas),
            "completo" => Some(ReportKind::Completo),
            _ => None,
        }
    }

    /// Download filename for the Content-Disposition header
    pub fn filename(&self) -> &'static str {
        match self {
            ReportKind::Redactadas => "reporte_redactadas.pdf",
            ReportKind::Revisadas => "reporte_revisadas.pdf",
            ReportKind::Completo => "reporte_completo.pdf",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Redactadas => "Palabras redactadas",
            ReportKind::Revisadas => "Palabras revisadas",
            ReportKind::Completo => "Reporte completo",
        }
    }

    /// Which word status feeds this report; `None` means all of them
    pub fn status_filter(&self) -> Option<WordStatus> {
        match self {
            ReportKind::Redactadas => Some(WordStatus::Redacted),
            ReportKind::Revisadas => Some(WordStatus::Reviewed),
            ReportKind::Completo => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Redactadas => "redactadas",
            ReportKind::Revisadas => "revisadas",
            ReportKind::Completo => "completo",
        }
    }
}

/// Renders a word list into PDF bytes
pub trait ReportRenderer: Send + Sync {
    fn render(&self, kind: ReportKind, words: &[Word]) -> Result<Vec<u8>>;
}

/// Delivers a rendered report to a recipient
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_report(
        &self,
        to: &str,
        subject: &str,
        filename: &str,
        pdf: Vec<u8>,
    ) -> Result<()>;
}

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const LINES_PER_PAGE: usize = 48;

/// Plain single-column PDF renderer
pub struct TypesetRenderer;

impl TypesetRenderer {
    pub fn new() -> Self {
        Self
    }

    fn lines(kind: ReportKind, words: &[Word]) -> Vec<String> {
        let mut lines = Vec::with_capacity(words.len() + 2);
        lines.push(kind.title().to_string());
        lines.push(format!("{} palabras", words.len()));
        for word in words {
            lines.push(format!("{} ({})", word.lemma, word.status));
        }
        lines
    }
}

impl Default for TypesetRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for TypesetRenderer {
    fn render(&self, kind: ReportKind, words: &[Word]) -> Result<Vec<u8>> {
        let lines = Self::lines(kind, words);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for chunk in lines.chunks(LINES_PER_PAGE) {
            let mut ops = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 11.into()]),
                Operation::new("TL", vec![15.into()]),
                Operation::new("Td", vec![50.into(), (PAGE_HEIGHT - 60).into()]),
            ];
            for line in chunk {
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(line.as_str())],
                ));
                ops.push(Operation::new("T*", vec![]));
            }
            ops.push(Operation::new("ET", vec![]));

            let content = Content { operations: ops };
            let encoded = content.encode().map_err(|e| AppError::Report {
                message: format!("Failed to encode page content: {}", e),
            })?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(|e| AppError::Report {
            message: format!("Failed to serialize PDF: {}", e),
        })?;

        Ok(buffer)
    }
}

/// Mailer that posts the PDF to a configured HTTP relay
pub struct RelayMailer {
    client: reqwest::Client,
    relay_url: Option<String>,
    from: String,
}

impl RelayMailer {
    pub fn new(config: &ReportConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.mail_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            relay_url: config.mail_relay_url.clone(),
            from: config.mail_from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send_report(
        &self,
        to: &str,
        subject: &str,
        filename: &str,
        pdf: Vec<u8>,
    ) -> Result<()> {
        let relay_url = self.relay_url.as_deref().ok_or_else(|| AppError::Mail {
            message: "no mail relay configured".to_string(),
        })?;

        let response = self
            .client
            .post(relay_url)
            .query(&[
                ("from", self.from.as_str()),
                ("to", to),
                ("subject", subject),
                ("filename", filename),
            ])
            .header("content-type", "application/pdf")
            .body(pdf)
            .send()
            .await
            .map_err(|e| AppError::Mail {
                message: format!("relay request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::Mail {
                message: format!("relay rejected the message: {}", response.status()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn word(lemma: &str, status: &str) -> Word {
        let now = chrono::Utc::now();
        Word {
            id: Uuid::new_v4(),
            lemma: lemma.to_string(),
            root: None,
            letter: lemma.chars().next().unwrap_or('a').to_string(),
            status: status.to_string(),
            created_by: None,
            assigned_to: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ReportKind::parse("redactadas"), Some(ReportKind::Redactadas));
        assert_eq!(ReportKind::parse("revisadas"), Some(ReportKind::Revisadas));
        assert_eq!(ReportKind::parse("completo"), Some(ReportKind::Completo));
        assert_eq!(ReportKind::parse("otro"), None);
    }

    #[test]
    fn test_filenames() {
        assert_eq!(ReportKind::Redactadas.filename(), "reporte_redactadas.pdf");
        assert_eq!(ReportKind::Revisadas.filename(), "reporte_revisadas.pdf");
        assert_eq!(ReportKind::Completo.filename(), "reporte_completo.pdf");
    }

    #[test]
    fn test_status_filters() {
        assert_eq!(
            ReportKind::Redactadas.status_filter(),
            Some(WordStatus::Redacted)
        );
        assert_eq!(ReportKind::Completo.status_filter(), None);
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let renderer = TypesetRenderer::new();
        let words = vec![word("casa", "redacted"), word("perro", "redacted")];
        let bytes = renderer.render(ReportKind::Redactadas, &words).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_paginates_long_reports() {
        let renderer = TypesetRenderer::new();
        let words: Vec<Word> = (0..200)
            .map(|i| word(&format!("palabra{:03}", i), "published"))
            .collect();
        let bytes = renderer.render(ReportKind::Completo, &words).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // 202 lines at 48 per page is 5 pages
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }
}
