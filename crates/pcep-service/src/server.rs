// Copyright (C) 2024-present The Pced Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Debug, io, net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
};
use tokio_util::codec::Framed;
use tower::ServiceExt;
use tower_service::Service;

use futures_util::{SinkExt, StreamExt};
use pcep_pkt::{
    codec::{PcepCodec, PcepCodecDecoderError},
    CloseMessage, CloseObject, ErrorMessage, PcepMessage, PcepObject, StateReportMessage,
    UpdateMessage,
};

use crate::{
    handle::PcepServerHandle,
    session::{
        PcepSession, SessionAction, SessionIdAllocator, SessionPhase,
        CLOSE_REASON_DEAD_TIMER_EXPIRED,
    },
    AddrInfo, TaggedData,
};

/// Tagged PCEP request: a state report from an established session, `None`
/// when the PCC disconnected, or a codec error.
pub type PcepRequest = Result<
    TaggedData<AddrInfo, Option<StateReportMessage>>,
    TaggedData<AddrInfo, PcepCodecDecoderError>,
>;

/// Allows the consuming service to send messages back to the PCC through
/// [`PcepServer`]
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum PcepServerResponse {
    /// Push a path update to the PCC that produced the report.
    SendUpdate(UpdateMessage),
    /// Ask PcepServer to close the given connection to the PCC.
    CloseConnection,
}

/// Listen and serve the PCEP protocol: accepts PCC connections, drives the
/// handshake and timers of each session, and hands decoded state reports to
/// the consuming service.
#[derive(Debug)]
pub struct PcepServer {
    local_addr: SocketAddr,
    keepalive: u8,
    handle: PcepServerHandle,
    session_ids: Arc<SessionIdAllocator>,
}

impl PcepServer {
    pub fn new(local_addr: SocketAddr, keepalive: u8, handle: PcepServerHandle) -> Self {
        Self {
            local_addr,
            keepalive,
            handle,
            session_ids: Arc::new(SessionIdAllocator::new()),
        }
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[tracing::instrument(skip(self,service), fields(local_addr=format!("{}", self.local_addr)))]
    pub async fn serve<S, E>(self, service: S) -> io::Result<()>
    where
        S: Service<PcepRequest, Response = Option<PcepServerResponse>, Error = E>
            + 'static
            + Send
            + Clone,
        S::Future: Send + 'static,
        S::Error: Send,
        E: Debug,
    {
        let local_addr = self.local_addr;
        tracing::info!("binding on socket");
        let listener = TcpListener::bind(local_addr).await?;
        let handle = self.handle;
        handle.notify_listening();
        tracing::info!("started listening");
        let accept_loop_future = async {
            loop {
                let (tcp_stream, remote_addr) = tokio::select! {
                    biased;
                    result = listener.accept() => {
                        let (tcp_stream, remote_addr) = result?;
                        tracing::info!("accepted new connection: {:?}", remote_addr);
                        (tcp_stream, remote_addr)
                    },
                    _ = handle.wait_shutdown() => {
                        tracing::info!("shutting down accept loop");
                        return Ok::<(), io::Error>(())
                    },
                };
                let addr_info = AddrInfo::new(local_addr, remote_addr);
                let framed = Framed::new(tcp_stream, PcepCodec::default());
                let session = PcepSession::new(self.keepalive, self.session_ids.next());
                let svc = service.clone();
                let watcher = handle.watcher();
                tokio::spawn(async move {
                    tracing::trace_span!("session_worker");
                    tracing::info!("worker_started");
                    tokio::select! {
                        biased;
                        _ = watcher.wait_shutdown() => {
                             tracing::info!("worker_shutdown: {:?}", addr_info);
                        },
                        ret = Self::handle_connection(svc.clone(), addr_info, framed, session) => {
                            tracing::info!("worker closed {:?} and service ret: {:?}", addr_info, ret);
                        },
                    }
                    tracing::info!("worker_ended");
                });
            }
        };
        tokio::select! {
            biased;
            _ = handle.wait_shutdown() => {
                tracing::info!("server is shutting down on request by handle");
                return Ok(())
            },
            result = accept_loop_future => {
                tracing::info!("server is shutting down due to: {:?}", result);
                result
            },
        }?;

        tracing::info!(
            "waiting on sessions to be cleanly closed. remaining sessions: {}",
            handle.connection_count()
        );
        handle.wait_connections_end().await;
        tracing::info!("server closed");
        Ok(())
    }

    #[tracing::instrument(
        skip(service, addr_info, framed, session),
        fields(
            local_socket=format!("{}", addr_info.local_socket()),
            remote_socket=format!("{}", addr_info.remote_socket()),
            session_id=session.session_id(),
        )
    )]
    async fn handle_connection<S, E>(
        mut service: S,
        addr_info: AddrInfo,
        framed: Framed<TcpStream, PcepCodec>,
        mut session: PcepSession,
    ) -> Result<(), E>
    where
        S: Service<PcepRequest, Response = Option<PcepServerResponse>, Error = E>
            + 'static
            + Send
            + Clone,
        S::Future: Send + 'static,
        S::Error: Send,
    {
        let (mut sink, mut stream) = framed.split();
        // Writes go through a channel so the keepalive timer and the read
        // loop can share the sink
        let (tx, mut rx) = mpsc::channel::<PcepMessage>(16);
        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(err) = sink.send(msg).await {
                    tracing::warn!("failed to write message: {:?}", err);
                    break;
                }
            }
        });
        let mut keepalive_task: Option<tokio::task::JoinHandle<()>> = None;

        loop {
            // Once established, a silent peer is bounded by the dead timer
            let next = match (session.phase(), session.dead_timer()) {
                (SessionPhase::Established, Some(dead_timer)) => {
                    match tokio::time::timeout(dead_timer, stream.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            tracing::info!("dead timer expired, closing session");
                            let close = PcepMessage::Close(CloseMessage::new(vec![
                                PcepObject::Close(CloseObject::new(
                                    CLOSE_REASON_DEAD_TIMER_EXPIRED,
                                )),
                            ]));
                            let _ = tx.send(close).await;
                            break;
                        }
                    }
                }
                _ => stream.next().await,
            };
            let Some(result) = next else {
                // PCC disconnected
                let tagged = Ok(TaggedData::new(addr_info, None));
                service.ready().await?;
                service.call(tagged).await?;
                break;
            };
            match result {
                Ok(msg) => match session.on_message(&msg) {
                    Ok(SessionAction::SendOpen(open)) => {
                        let _ = tx.send(PcepMessage::Open(open)).await;
                        // The session is established once our Open is out;
                        // the PCC may report state right away
                        session.establish();
                        tracing::info!("session established");
                        if let Some(interval) = session.keepalive_interval() {
                            let keepalive_tx = tx.clone();
                            keepalive_task = Some(tokio::spawn(async move {
                                let mut ticker = tokio::time::interval(interval);
                                loop {
                                    ticker.tick().await;
                                    if keepalive_tx.send(PcepMessage::Keepalive).await.is_err() {
                                        break;
                                    }
                                }
                            }));
                        }
                    }
                    Ok(SessionAction::DeliverReport(report)) => {
                        let tagged = Ok(TaggedData::new(addr_info, Some(report)));
                        service.ready().await?;
                        match service.call(tagged).await? {
                            Some(PcepServerResponse::SendUpdate(update)) => {
                                let _ = tx.send(PcepMessage::Update(update)).await;
                            }
                            Some(PcepServerResponse::CloseConnection) => break,
                            None => {}
                        }
                    }
                    Ok(SessionAction::Ignore) => {
                        tracing::trace!("ignoring message: {:?}", msg.get_type());
                    }
                    Ok(SessionAction::Closed) => {
                        tracing::info!("session closed by peer");
                        break;
                    }
                    Err(err) => {
                        tracing::warn!("session error: {}", err);
                        let error_msg = PcepMessage::Error(ErrorMessage::new(vec![
                            PcepObject::PcepError(err.error_object()),
                        ]));
                        let _ = tx.send(error_msg).await;
                        break;
                    }
                },
                Err(err) => {
                    let tagged = Err(TaggedData::new(addr_info, err));
                    service.ready().await?;
                    service.call(tagged).await?;
                    break;
                }
            }
        }
        if let Some(task) = keepalive_task {
            task.abort();
        }
        // Closing the channel lets the writer drain anything still queued
        drop(tx);
        let _ = writer.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        convert::Infallible,
        net::{IpAddr, Ipv4Addr},
        time::Duration,
    };

    use super::*;
    use pcep_pkt::{
        iana::LspOperationalStatus, LspObject, OpenMessage, StateReportMessage,
    };
    use rand::Rng;
    use tokio::task::JoinHandle;
    use tower::{service_fn, ServiceBuilder};

    #[tokio::test]
    async fn test_start() {
        let (handle, server, addr, _rx) = start_server().await;
        let mut client = connect(addr).await;
        let msg = PcepMessage::Open(OpenMessage::stateful(30, 9));
        client.send(msg).await.unwrap();
        handle.shutdown();
        // yield to let the server handle the shutdown signal
        tokio::task::yield_now().await;
        assert!(server.is_finished());
    }

    #[tokio::test]
    async fn test_shutdown() {
        let (handle, server, addr, _rx) = start_server().await;
        let mut client = connect(addr).await;
        let msg = PcepMessage::Open(OpenMessage::stateful(30, 9));
        client.send(msg.clone()).await.unwrap();
        handle.shutdown();
        // yield to let the server handle the shutdown signal
        tokio::time::sleep(Duration::from_millis(100)).await;
        // No clients should be able to connect
        assert!(client.send(msg).await.is_err());
        assert!(server.is_finished());
    }

    #[tokio::test]
    async fn test_handshake_and_report_delivery() {
        let (handle, _server, addr, mut rx) = start_server().await;
        let mut client = connect(addr).await;

        client
            .send(PcepMessage::Open(OpenMessage::stateful(30, 9)))
            .await
            .unwrap();
        // The first session gets SID 0
        let open = client.next().await.unwrap().unwrap();
        assert_eq!(open, PcepMessage::Open(OpenMessage::stateful(30, 0)));
        // Establishment starts the keepalive cadence with an immediate tick
        let keepalive = client.next().await.unwrap().unwrap();
        assert_eq!(keepalive, PcepMessage::Keepalive);

        // A report straight after the handshake, without any Keepalive from
        // the PCC, must reach the service
        let report = StateReportMessage::new(vec![PcepObject::Lsp(LspObject::new(
            1,
            true,
            false,
            false,
            true,
            LspOperationalStatus::Up,
            vec![],
        ))]);
        client
            .send(PcepMessage::StateReport(report.clone()))
            .await
            .unwrap();
        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered, report);

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_report_before_handshake_is_rejected() {
        let (handle, _server, addr, mut rx) = start_server().await;
        let mut client = connect(addr).await;

        client
            .send(PcepMessage::StateReport(StateReportMessage::new(vec![])))
            .await
            .unwrap();
        let response = client.next().await.unwrap().unwrap();
        match response {
            PcepMessage::Error(_) => {}
            other => panic!("expected an error message, got {other:?}"),
        }
        // The report never reaches the service
        assert!(rx.try_recv().is_err());

        handle.shutdown();
    }

    fn get_free_socket() -> SocketAddr {
        let mut rng = rand::rng();
        let port: u16 = rng.random_range(25000..50000);
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    async fn connect(addr: SocketAddr) -> Framed<TcpStream, PcepCodec> {
        let stream = TcpStream::connect(addr).await.unwrap();
        Framed::new(stream, PcepCodec::default())
    }

    async fn start_server() -> (
        PcepServerHandle,
        JoinHandle<io::Result<()>>,
        SocketAddr,
        tokio::sync::mpsc::UnboundedReceiver<StateReportMessage>,
    ) {
        let handle = PcepServerHandle::default();
        let server_handle = handle.clone();
        let addr = get_free_socket();
        let (report_tx, report_rx) = tokio::sync::mpsc::unbounded_channel();
        let server_task = tokio::spawn(async move {
            let svc = ServiceBuilder::new().service(service_fn(move |request: PcepRequest| {
                let report_tx = report_tx.clone();
                async move {
                    if let Ok(tagged) = &request {
                        if let Some(report) = tagged.value() {
                            report_tx.send(report.clone()).unwrap();
                        }
                    }
                    Ok::<Option<PcepServerResponse>, Infallible>(None)
                }
            }));

            PcepServer::new(addr, 30, server_handle).serve(svc).await
        });
        handle.listening().await;
        (handle, server_task, addr, report_rx)
    }
}
