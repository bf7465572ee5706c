use futures::stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::application::ports::LlmTokenStream;

/// Ends `stream` as soon as `cancel` fires.
///
/// Chunks already handed out stay delivered; after cancellation the stream
/// yields nothing more, errors included.
pub fn cancellable(stream: LlmTokenStream, cancel: CancellationToken) -> LlmTokenStream {
    Box::pin(async_stream::stream! {
        let mut stream = stream;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Token stream cancelled by caller");
                    break;
                }
                item = stream.next() => {
                    match item {
                        Some(item) => yield item,
                        None => break,
                    }
                }
            }
        }
    })
}
