//! WebRTC peer connection plumbing
//!
//! Builds the receive-only peer connection, wires its ICE and track
//! callbacks to the session's event channel, and owns teardown of the
//! negotiated link.

pub mod offer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

use crate::config::LiveViewConfig;
use crate::media::MediaTrack;
use crate::session::{AttemptContext, MediaLink, Negotiator, SessionEvent};
use crate::signaling::{SignalingTarget, WhepAnswer, WhepExchange};
use crate::{Error, Result};

/// Build a peer connection with the preferred codec ordering and default
/// interceptors
pub async fn build_peer_connection(config: &LiveViewConfig) -> Result<Arc<RTCPeerConnection>> {
    let mut media_engine = offer::preferred_media_engine()?;

    let mut registry = Registry::new();
    registry = register_default_interceptors(registry, &mut media_engine)
        .map_err(|e| Error::WebRtc(format!("failed to register interceptors: {e}")))?;

    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let rtc_config = RTCConfiguration {
        ice_servers: config
            .ice_servers
            .iter()
            .map(|s| RTCIceServer {
                urls: s.urls.clone(),
                username: s.username.clone().unwrap_or_default(),
                credential: s.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let peer_connection = api
        .new_peer_connection(rtc_config)
        .await
        .map_err(|e| Error::WebRtc(format!("failed to create peer connection: {e}")))?;

    Ok(Arc::new(peer_connection))
}

/// Stop all transceivers and close the connection. Errors here mean the
/// connection is already gone, so they are only logged.
pub(crate) async fn shutdown_peer(peer_connection: &Arc<RTCPeerConnection>) {
    for transceiver in peer_connection.get_transceivers().await {
        if let Err(e) = transceiver.stop().await {
            debug!(error = %e, "transceiver stop failed");
        }
    }
    if let Err(e) = peer_connection.close().await {
        debug!(error = %e, "peer connection close failed");
    }
}

/// Negotiated connection owned by its session
pub(crate) struct PeerLink {
    peer_connection: Arc<RTCPeerConnection>,
    resource: Option<String>,
    exchange: WhepExchange,
}

#[async_trait]
impl MediaLink for PeerLink {
    async fn shutdown(self: Box<Self>) {
        if let Some(resource) = self.resource.as_deref() {
            self.exchange.release(resource).await;
        }
        shutdown_peer(&self.peer_connection).await;
    }
}

/// Production negotiator: WebRTC offer + WHEP exchange
pub(crate) struct WhepNegotiator {
    config: LiveViewConfig,
    exchange: WhepExchange,
}

impl WhepNegotiator {
    pub fn new(config: LiveViewConfig) -> Result<Self> {
        let exchange = WhepExchange::new(Duration::from_millis(config.request_timeout_ms))?;
        Ok(Self { config, exchange })
    }
}

#[async_trait]
impl Negotiator for WhepNegotiator {
    async fn negotiate(
        &self,
        target: &SignalingTarget,
        attempt: AttemptContext,
    ) -> Result<Box<dyn MediaLink>> {
        let peer_connection = build_peer_connection(&self.config).await?;

        let ctx = attempt.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |state: RTCIceConnectionState| {
                let ctx = ctx.clone();
                Box::pin(async move {
                    match state {
                        RTCIceConnectionState::Connected => {
                            debug!(generation = %ctx.generation, "ICE connected");
                        }
                        RTCIceConnectionState::Failed | RTCIceConnectionState::Closed => {
                            debug!(generation = %ctx.generation, %state, "ICE link degraded");
                            ctx.emit_if_current(SessionEvent::LinkDown {
                                generation: ctx.generation,
                            });
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ctx = attempt.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let ctx = ctx.clone();
                Box::pin(async move {
                    debug!(generation = %ctx.generation, kind = %track.kind(), "inbound media track");
                    ctx.emit_if_current(SessionEvent::TrackReady {
                        generation: ctx.generation,
                        track: MediaTrack::from_remote(track),
                    });
                })
            },
        ));

        let offer_sdp = match offer::build_receive_offer(&peer_connection).await {
            Ok(sdp) => sdp,
            Err(e) => {
                shutdown_peer(&peer_connection).await;
                return Err(e);
            }
        };

        let WhepAnswer { answer, resource } =
            match self.exchange.request_answer(target, &offer_sdp).await {
                Ok(answer) => answer,
                Err(e) => {
                    shutdown_peer(&peer_connection).await;
                    return Err(e);
                }
            };

        if let Err(e) = peer_connection.set_remote_description(answer).await {
            shutdown_peer(&peer_connection).await;
            return Err(Error::WebRtc(format!("failed to apply remote answer: {e}")));
        }

        Ok(Box::new(PeerLink {
            peer_connection,
            resource,
            exchange: self.exchange.clone(),
        }))
    }
}
