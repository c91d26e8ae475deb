use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

use log::{debug, warn};
use tokio::sync::Mutex;
use tower::{BoxError, Layer, Service, ServiceExt};

use crate::types::message::Message;

/// Turns raw datagrams into [`Message`]s. Undecodable datagrams are logged and
/// dropped without reaching the inner service.
pub struct DecodeService<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> DecodeService<S> {
    fn new(inner: S) -> Self {
        DecodeService {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl<S> Service<Vec<u8>> for DecodeService<S>
where
    S: Service<Message, Response = ()> + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = ();
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, datagram: Vec<u8>) -> Self::Future {
        let decoded = Message::try_from(datagram.as_slice());
        let inner = self.inner.clone();

        Box::pin(async move {
            let message = match decoded {
                Ok(message) => message,
                Err(err) => {
                    warn!("dropping malformed datagram {datagram:?}: {err}");
                    return Ok(());
                }
            };
            debug!("received {message}");

            let mut inner = inner.lock().await;
            let ready = ServiceExt::<Message>::ready(&mut *inner)
                .await
                .map_err(boxed)?;
            ready.call(message).await.map_err(boxed)
        })
    }
}

fn boxed(err: impl Into<BoxError>) -> anyhow::Error {
    let err: BoxError = err.into();
    anyhow::anyhow!(err)
}

pub struct DecodeLayer;

impl<S> Layer<S> for DecodeLayer {
    type Service = DecodeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DecodeService::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tower::service_fn;

    #[tokio::test]
    async fn forwards_decoded_messages_and_drops_garbage() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            service_fn(move |message: Message| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().unwrap().push(message);
                    Ok::<(), BoxError>(())
                }
            })
        };
        let mut svc = DecodeLayer.layer(sink);

        svc.call(vec![6]).await.unwrap();
        svc.call(vec![77, 1, 2]).await.unwrap();
        svc.call(Vec::new()).await.unwrap();
        svc.call(Message::Register { id: 2, port: 9 }.encode())
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Message::Terminate, Message::Register { id: 2, port: 9 }]
        );
    }
}
