use crate::client::{path_segment, BtcMarketsClient};
use crate::core::errors::Result;
use crate::core::kernel::rest::NO_BODY;
use crate::core::types::{CreatedReport, NewReport, Report};
use reqwest::Method;
use tracing::instrument;

/// Asynchronous account reports. A created report is polled with
/// [`ReportService::get_report`] until its `content_url` is set.
#[derive(Debug, Clone)]
pub struct ReportService {
    client: BtcMarketsClient,
}

impl ReportService {
    pub(crate) fn new(client: BtcMarketsClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn create_report(&self, report: &NewReport) -> Result<CreatedReport> {
        let request = self
            .client
            .new_request(Method::POST, "/reports", Some(report))?;
        self.client.execute_authenticated(request).await
    }

    #[instrument(skip(self))]
    pub async fn get_report(&self, report_id: &str) -> Result<Report> {
        let report_id = path_segment("reportId", report_id)?;
        let request =
            self.client
                .new_request(Method::GET, &format!("/reports/{}", report_id), NO_BODY)?;
        self.client.execute_authenticated(request).await
    }
}
