use crate::api::conversions::{build_master_download_request, convert_master_record};
use crate::core::{
    errors::ExchangeError,
    kernel::{ApiClient, Requester, Session},
    traits::MasterDataSource,
    types::{MasterDownloadRequest, MasterRecord},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Master and reference data downloads
#[derive(Debug)]
pub struct MasterData<R: Requester> {
    client: ApiClient<R>,
}

impl<R: Requester + Clone> MasterData<R> {
    pub fn new(client: &ApiClient<R>) -> Self {
        Self {
            client: client.clone(),
        }
    }
}

#[async_trait]
impl<R: Requester> MasterDataSource for MasterData<R> {
    #[instrument(skip(self, ctx, session, request), fields(exchange = "e-shiten"))]
    async fn download_master(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: MasterDownloadRequest,
    ) -> Result<Vec<MasterRecord>, ExchangeError> {
        let wire = build_master_download_request(&request);
        let records = self.client.invoke_stream(ctx, session, &wire).await?;
        debug!(count = records.len(), "Master download finished");

        Ok(records.into_iter().map(convert_master_record).collect())
    }
}
