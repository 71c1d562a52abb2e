use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{DocumentRenderer, PageGeometry, RenderError};
use crate::core::config::Orientation;
use crate::report::template::ReportTemplate;
use crate::report::types::ReportRecord;

const POINTS_PER_INCH: f32 = 72.0;

/// Posts the filled HTML template to an HTML-to-PDF conversion service
/// (Gotenberg-style multipart API) and returns the converted bytes.
pub struct RemotePdfRenderer {
    client: Client,
    url: String,
    template: ReportTemplate,
    geometry: PageGeometry,
    orientation: Orientation,
    timeout: Duration,
}

impl RemotePdfRenderer {
    pub fn new(
        url: &str,
        template: ReportTemplate,
        geometry: PageGeometry,
        orientation: Orientation,
        timeout: Duration,
    ) -> Result<Self, RenderError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RenderError::Template(
                "render.remote_url is required for the remote backend".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            template,
            geometry,
            orientation,
            timeout,
        })
    }

    fn html(&self, report: &ReportRecord) -> Result<String, RenderError> {
        let data =
            serde_json::to_value(report).map_err(|e| RenderError::Template(e.to_string()))?;
        Ok(self.template.render(&data))
    }

    /// Text fields sent next to the HTML part. Dimensions are in inches.
    fn page_fields(&self) -> Vec<(&'static str, String)> {
        // The service applies `landscape` itself, so send portrait dimensions.
        let (width, height) = match self.orientation {
            Orientation::Portrait => (self.geometry.width, self.geometry.height),
            Orientation::Landscape => (self.geometry.height, self.geometry.width),
        };
        let margin = inches(self.geometry.margin);
        vec![
            ("paperWidth", inches(width)),
            ("paperHeight", inches(height)),
            ("marginTop", margin.clone()),
            ("marginBottom", margin.clone()),
            ("marginLeft", margin.clone()),
            ("marginRight", margin),
            (
                "landscape",
                matches!(self.orientation, Orientation::Landscape).to_string(),
            ),
        ]
    }

    fn form(&self, html: String) -> Result<Form, RenderError> {
        let part = Part::text(html)
            .file_name("index.html")
            .mime_str("text/html")
            .map_err(|e| RenderError::Template(e.to_string()))?;
        let mut form = Form::new().part("files", part);
        for (name, value) in self.page_fields() {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

fn inches(points: f32) -> String {
    format!("{:.2}", points / POINTS_PER_INCH)
}

#[async_trait]
impl DocumentRenderer for RemotePdfRenderer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn render(&self, report: &ReportRecord) -> Result<Vec<u8>, RenderError> {
        let form = self.form(self.html(report)?)?;
        tracing::debug!("Posting report to renderer at {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RenderError::Timeout(self.timeout)
                } else {
                    RenderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RenderConfig;
    use crate::report::types::{ReportFindings, ReportInfo};

    fn renderer(orientation: Orientation) -> RemotePdfRenderer {
        let config = RenderConfig {
            orientation,
            ..RenderConfig::default()
        };
        RemotePdfRenderer::new(
            "http://localhost:3001/forms/chromium/convert/html",
            ReportTemplate::builtin().unwrap(),
            PageGeometry::from_config(&config).unwrap(),
            orientation,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> &'a str {
        fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn a4_portrait_fields_in_inches() {
        let fields = renderer(Orientation::Portrait).page_fields();
        assert_eq!(field(&fields, "paperWidth"), "8.27");
        assert_eq!(field(&fields, "paperHeight"), "11.69");
        assert_eq!(field(&fields, "marginTop"), "0.39");
        assert_eq!(field(&fields, "marginRight"), "0.39");
        assert_eq!(field(&fields, "landscape"), "false");
    }

    #[test]
    fn landscape_keeps_portrait_dimensions_and_sets_flag() {
        let fields = renderer(Orientation::Landscape).page_fields();
        assert_eq!(field(&fields, "paperWidth"), "8.27");
        assert_eq!(field(&fields, "paperHeight"), "11.69");
        assert_eq!(field(&fields, "landscape"), "true");
    }

    #[test]
    fn html_contains_report_fields() {
        let record = ReportRecord {
            info: ReportInfo {
                registration: String::new(),
                register_date: "2024-01-01".to_string(),
                company: "Acme".to_string(),
                now_date: "2024-03-07".to_string(),
                name: "Jane Doe".to_string(),
                report: "Patentability Diagnostic Report".to_string(),
                summary: "A widget".to_string(),
            },
            result: ReportFindings {
                other_patents: vec![],
                opinion: "Likely registrable.".to_string(),
                probability: None,
            },
        };
        let html = renderer(Orientation::Portrait).html(&record).unwrap();
        assert!(html.contains("Jane Doe"));
        assert!(html.contains("Acme"));
        assert!(html.contains("Likely registrable."));
    }

    #[test]
    fn blank_url_is_rejected() {
        let result = RemotePdfRenderer::new(
            "  ",
            ReportTemplate::builtin().unwrap(),
            PageGeometry::from_config(&RenderConfig::default()).unwrap(),
            Orientation::Portrait,
            Duration::from_secs(5),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let renderer = RemotePdfRenderer::new(
            "http://127.0.0.1:9/convert",
            ReportTemplate::builtin().unwrap(),
            PageGeometry::from_config(&RenderConfig::default()).unwrap(),
            Orientation::Portrait,
            Duration::from_secs(5),
        )
        .unwrap();
        let record = ReportRecord {
            info: ReportInfo {
                registration: String::new(),
                register_date: String::new(),
                company: String::new(),
                now_date: String::new(),
                name: String::new(),
                report: String::new(),
                summary: String::new(),
            },
            result: ReportFindings {
                other_patents: vec![],
                opinion: String::new(),
                probability: None,
            },
        };
        let err = renderer.render(&record).await.unwrap_err();
        assert!(matches!(err, RenderError::Transport(_) | RenderError::Timeout(_)));
    }
}
