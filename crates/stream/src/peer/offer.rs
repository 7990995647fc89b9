//! Receive-only offer construction
//!
//! Adds exactly one inbound video transceiver and waits for ICE candidate
//! gathering to complete so the full SDP travels in a single exchange (no
//! trickle ICE). Codec preference is expressed through the media engine's
//! registration order: the negotiable video set is reordered so H.264
//! entries sort first, preserving relative order within each group. The
//! reorder is advisory; if preferred registration fails the engine falls
//! back to the stock default codecs.

use std::sync::Arc;

use tracing::debug;
use webrtc::api::media_engine::{MediaEngine, MIME_TYPE_H264, MIME_TYPE_VP8, MIME_TYPE_VP9};
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::{
    RTCRtpCodecCapability, RTCRtpCodecParameters, RTPCodecType,
};
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;

use crate::{Error, Result};

/// Build a media engine with the H.264-first video codec ordering
pub(crate) fn preferred_media_engine() -> Result<MediaEngine> {
    let mut media_engine = MediaEngine::default();
    if let Err(e) = register_preferred_codecs(&mut media_engine) {
        debug!(error = %e, "preferred codec registration failed; using default ordering");
        media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| Error::WebRtc(format!("failed to register codecs: {e}")))?;
    }
    Ok(media_engine)
}

fn register_preferred_codecs(media_engine: &mut MediaEngine) -> webrtc::error::Result<()> {
    for codec in h264_first(negotiable_video_codecs()) {
        media_engine.register_codec(codec, RTPCodecType::Video)?;
    }
    Ok(())
}

/// Build the local session description for a receive-only video exchange.
/// Returns the complete SDP with gathered candidates.
pub async fn build_receive_offer(peer_connection: &Arc<RTCPeerConnection>) -> Result<String> {
    peer_connection
        .add_transceiver_from_kind(
            RTPCodecType::Video,
            Some(RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Recvonly,
                send_encodings: vec![],
            }),
        )
        .await
        .map_err(|e| Error::WebRtc(format!("failed to add video transceiver: {e}")))?;

    let offer = peer_connection
        .create_offer(None)
        .await
        .map_err(|e| Error::WebRtc(format!("failed to create offer: {e}")))?;

    let mut gather_complete = peer_connection.gathering_complete_promise().await;
    peer_connection
        .set_local_description(offer)
        .await
        .map_err(|e| Error::WebRtc(format!("failed to set local description: {e}")))?;
    let _ = gather_complete.recv().await;

    let local = peer_connection
        .local_description()
        .await
        .ok_or_else(|| Error::WebRtc("local description missing after gathering".to_string()))?;

    Ok(local.sdp)
}

/// Stable partition: H.264 entries first, relative order preserved within
/// each group
fn h264_first(codecs: Vec<RTCRtpCodecParameters>) -> Vec<RTCRtpCodecParameters> {
    let (h264, others): (Vec<_>, Vec<_>) = codecs
        .into_iter()
        .partition(|c| c.capability.mime_type == MIME_TYPE_H264);
    h264.into_iter().chain(others).collect()
}

/// The negotiable video codec set, in stock registration order
fn negotiable_video_codecs() -> Vec<RTCRtpCodecParameters> {
    vec![
        video_codec(MIME_TYPE_VP8, "", 96),
        video_codec(MIME_TYPE_VP9, "profile-id=0", 98),
        video_codec(
            MIME_TYPE_H264,
            "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f",
            102,
        ),
        video_codec(
            MIME_TYPE_H264,
            "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f",
            127,
        ),
    ]
}

fn video_codec(mime_type: &str, sdp_fmtp_line: &str, payload_type: u8) -> RTCRtpCodecParameters {
    RTCRtpCodecParameters {
        capability: RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            clock_rate: 90000,
            channels: 0,
            sdp_fmtp_line: sdp_fmtp_line.to_owned(),
            rtcp_feedback: vec![],
        },
        payload_type,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LiveViewConfig;
    use crate::peer::{build_peer_connection, shutdown_peer};
    use std::time::Duration;

    #[test]
    fn h264_sorts_first_preserving_group_order() {
        let reordered = h264_first(negotiable_video_codecs());

        assert_eq!(reordered[0].capability.mime_type, MIME_TYPE_H264);
        assert_eq!(reordered[1].capability.mime_type, MIME_TYPE_H264);
        // Relative order within each group is unchanged
        assert_eq!(reordered[0].payload_type, 102);
        assert_eq!(reordered[1].payload_type, 127);
        assert_eq!(reordered[2].capability.mime_type, MIME_TYPE_VP8);
        assert_eq!(reordered[3].capability.mime_type, MIME_TYPE_VP9);
    }

    #[tokio::test]
    async fn receive_offer_is_single_recvonly_video() {
        // Host candidates only; no STUN round trip in tests
        let config = LiveViewConfig::default().with_ice_servers(vec![]);
        let peer_connection = build_peer_connection(&config).await.unwrap();

        let sdp = tokio::time::timeout(
            Duration::from_secs(10),
            build_receive_offer(&peer_connection),
        )
        .await
        .expect("ICE gathering did not complete")
        .unwrap();

        assert_eq!(sdp.matches("m=video").count(), 1);
        assert!(!sdp.contains("m=audio"));
        assert!(sdp.contains("a=recvonly"));
        // H.264 is offered ahead of the other codecs
        let h264 = sdp.find("H264").expect("H264 offered");
        let vp8 = sdp.find("VP8").expect("VP8 offered");
        assert!(h264 < vp8);

        shutdown_peer(&peer_connection).await;
    }
}
