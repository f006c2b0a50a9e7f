use crate::error::RelayError;
use crate::upstream::ChunkStream;
use async_stream::try_stream;
use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use log::{debug, error, info};

/// Forward a chunk stream to the client as server-push event frames.
///
/// Each chunk has its creation timestamp normalized, is serialized to JSON,
/// and is framed as `data: <json>\n\n`, in arrival order. The stream is
/// pull-driven: the next chunk is not requested until the previous frame has
/// been accepted by the outbound transport, and dropping the returned stream
/// (client disconnect) drops the upstream stream with it.
pub fn relay_stream(mut chunks: ChunkStream) -> impl Stream<Item = Result<Bytes, RelayError>> {
    try_stream! {
        while let Some(next) = chunks.next().await {
            let mut chunk = match next {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!("terminating event stream: {}", e);
                    Err(e)?
                }
            };
            chunk.normalize_created();
            let payload = serde_json::to_string(&chunk)?;
            debug!("sending chunk: {}", payload);
            yield Bytes::from(format!("data: {payload}\n\n"));
        }
        info!("finished sending response");
    }
}
