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

use std::{
    convert::Infallible,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pced::controller::TeController;
use pcep_pkt::iana::DEFAULT_PCEP_PORT;
use pcep_service::{
    handle::PcepServerHandle,
    server::{PcepRequest, PcepServer, PcepServerResponse},
};

#[derive(Parser, Debug)]
#[command(version, about = "Stateful Path Computation Element daemon")]
struct Args {
    /// Address to accept PCC connections on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    listen: IpAddr,

    /// TCP port to accept PCC connections on
    #[arg(long, default_value_t = DEFAULT_PCEP_PORT)]
    port: u16,

    /// Keepalive timer advertised in our Open messages, in seconds
    #[arg(long, default_value_t = 30)]
    keepalive: u8,

    /// Default log level, overridden by `RUST_LOG` when set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(default_level: &str) {
    let log_level = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::filter::EnvFilter::try_new(default_level))
        .expect("failed to create log filter");
    tracing_subscriber::registry()
        .with(log_level)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .expect("failed to init tracing");
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    init_tracing(&args.log_level);
    let listen_addr = SocketAddr::new(args.listen, args.port);

    let controller = TeController::new();
    let handle = PcepServerHandle::new();
    let server = PcepServer::new(listen_addr, args.keepalive, handle.clone());

    let svc_controller = controller.clone();
    let svc = tower::ServiceBuilder::new().service(tower::service_fn(
        move |request: PcepRequest| {
            let controller = svc_controller.clone();
            async move {
                match request {
                    Ok(data) => {
                        let peer = data.tag().remote_socket();
                        match data.value() {
                            Some(report) => {
                                let update = controller.handle_report(peer.ip(), report);
                                Ok::<_, Infallible>(update.map(PcepServerResponse::SendUpdate))
                            }
                            None => {
                                info!("PCC {peer} disconnected");
                                controller.remove_pcc(peer.ip());
                                Ok(None)
                            }
                        }
                    }
                    Err(err) => {
                        warn!("closing session to PCC {}: {err}", err.tag().remote_socket());
                        Ok(Some(PcepServerResponse::CloseConnection))
                    }
                }
            }
        },
    ));

    info!("starting PCE server listening on {listen_addr}");
    let mut server_task = tokio::spawn(server.serve(svc));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("termination signal received, shutting down");
            handle.shutdown();
            server_task.await??;
        }
        result = &mut server_task => {
            result??;
        }
    }
    Ok(())
}
