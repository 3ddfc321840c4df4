/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Incremental (multicast) channel.
//!
//! Datagrams are framed, decoded against the template catalog with a
//! channel-owned field dictionary, then checked for sequence gaps. A payload
//! that fails to decode is logged and skipped; the stream keeps flowing.

use crate::event::{Channel, FeedEvent, FeedStats};
use crate::recovery::RecoveryCommand;
use fastfeed_core::TransportError;
use fastfeed_fast::{DecodeOutcome, FieldDictionary, MessageDecoder};
use fastfeed_session::SequenceTracker;
use fastfeed_transport::FrameCodec;
use fastfeed_transport::multicast::MAX_DATAGRAM_SIZE;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Per-channel decode context.
#[derive(Debug)]
pub struct IncrementalPipeline {
    codec: FrameCodec,
    decoder: MessageDecoder,
    dictionary: FieldDictionary,
    sequences: SequenceTracker,
    stats: FeedStats,
}

impl IncrementalPipeline {
    /// Creates a pipeline around `decoder`.
    #[must_use]
    pub fn new(decoder: MessageDecoder) -> Self {
        Self {
            codec: FrameCodec::new(),
            decoder,
            dictionary: FieldDictionary::new(),
            sequences: SequenceTracker::new(),
            stats: FeedStats::default(),
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.codec = FrameCodec::new().with_max_frame_size(size);
        self
    }

    /// Seeds the channel sequence baseline.
    #[must_use]
    pub fn with_sequence_baseline(mut self, last: u64) -> Self {
        self.sequences = SequenceTracker::with_initial(last);
        self
    }

    /// Processes one datagram, appending the resulting events to `out`.
    ///
    /// Gap events precede the market event that revealed them.
    pub fn process_datagram(&mut self, datagram: &[u8], out: &mut Vec<FeedEvent>) {
        let Self {
            codec,
            decoder,
            dictionary,
            sequences,
            stats,
        } = self;
        stats.packets += 1;

        for payload in codec.feed(datagram) {
            stats.payloads += 1;
            let event = match decoder.decode(&payload, dictionary) {
                Ok(DecodeOutcome::Decoded(event)) => {
                    stats.decoded += 1;
                    event
                }
                Ok(DecodeOutcome::UnknownTemplate(event)) => {
                    stats.unknown_templates += 1;
                    event
                }
                Err(err) => {
                    stats.discarded += 1;
                    warn!(error = %err, len = payload.len(), "discarding payload");
                    continue;
                }
            };

            let observation = sequences.observe(&event);
            out.extend(observation.gaps.into_iter().map(FeedEvent::Recovery));
            if observation.accepted {
                out.push(FeedEvent::Market(event));
            } else {
                stats.duplicates += 1;
            }
        }
        stats.resyncs = codec.resyncs();
    }

    /// Returns the channel counters.
    #[must_use]
    pub const fn stats(&self) -> FeedStats {
        self.stats
    }

    /// Returns the sequence tracker.
    #[must_use]
    pub const fn sequences(&self) -> &SequenceTracker {
        &self.sequences
    }
}

/// Receives datagrams on `socket` until cancelled or the consumer goes away.
///
/// Gaps are forwarded to the recovery task without waiting; a full recovery
/// queue drops the request with a warning.
///
/// # Errors
/// Returns `TransportError::Io` if receiving fails. The channel stops and a
/// [`FeedEvent::ChannelClosed`] is published first.
pub async fn run_multicast(
    socket: UdpSocket,
    mut pipeline: IncrementalPipeline,
    events: mpsc::Sender<FeedEvent>,
    recovery: mpsc::Sender<RecoveryCommand>,
    cancel: CancellationToken,
) -> Result<FeedStats, TransportError> {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut batch = Vec::new();

    let outcome = 'recv: loop {
        tokio::select! {
            () = cancel.cancelled() => break 'recv Ok(()),
            received = socket.recv_from(&mut buf) => {
                let (len, from) = match received {
                    Ok(received) => received,
                    Err(err) => break 'recv Err(TransportError::from(err)),
                };
                debug!(%from, len, "datagram");
                pipeline.process_datagram(&buf[..len], &mut batch);

                for event in batch.drain(..) {
                    if let FeedEvent::Recovery(gap) = &event {
                        match recovery.try_send(RecoveryCommand::Gap(gap.clone())) {
                            Ok(()) | Err(TrySendError::Closed(_)) => {}
                            Err(TrySendError::Full(_)) => warn!(%gap, "recovery queue full, request dropped"),
                        }
                    }
                    if events.send(event).await.is_err() {
                        info!("event consumer closed");
                        break 'recv Ok(());
                    }
                }
            }
        }
    };

    let stats = pipeline.stats();
    info!(
        packets = stats.packets,
        payloads = stats.payloads,
        discarded = stats.discarded,
        resyncs = stats.resyncs,
        "multicast channel closed"
    );
    match outcome {
        Ok(()) => Ok(stats),
        Err(err) => {
            error!(error = %err, "multicast receive failed");
            let closed = FeedEvent::ChannelClosed {
                channel: Channel::Incremental,
                reason: err.to_string(),
            };
            if events.send(closed).await.is_err() {
                debug!("event consumer closed, channel failure not delivered");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use crate::recovery::run_recovery;
    use fastfeed_core::{EntryType, MsgType, tags};
    use fastfeed_dictionary::{FieldDescriptor, Operator, Template, TemplateCatalog, WireType};
    use fastfeed_fast::{DecoderConfig, FastEncoder};
    use fastfeed_transport::encode_frame;
    use std::sync::Arc;

    fn pipeline() -> IncrementalPipeline {
        let catalog = TemplateCatalog::new()
            .with_template(Template::new(
                70,
                "Incremental",
                vec![
                    FieldDescriptor::new(55, "Symbol", WireType::Ascii)
                        .with_operator(Operator::Copy),
                    FieldDescriptor::new(269, "MDEntryType", WireType::Ascii),
                    FieldDescriptor::new(270, "MDEntryPx", WireType::Decimal),
                    FieldDescriptor::new(1181, "ApplSeqNum", WireType::UnsignedInt),
                ],
            ))
            .unwrap();
        let decoder = MessageDecoder::new(Arc::new(catalog), &DecoderConfig::default()).unwrap();
        IncrementalPipeline::new(decoder)
    }

    fn payload(symbol: Option<&str>, price: i64, seq: u64) -> Vec<u8> {
        let mut enc = FastEncoder::new();
        enc.encode_pmap(&[symbol.is_some()]);
        enc.encode_uint(70);
        if let Some(symbol) = symbol {
            enc.encode_ascii(symbol);
        }
        enc.encode_ascii("0");
        enc.encode_int(price);
        enc.encode_uint(seq);
        enc.finish().to_vec()
    }

    fn datagram(payloads: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for p in payloads {
            encode_frame(p, &mut buf);
        }
        buf.to_vec()
    }

    fn sequences(events: &[FeedEvent]) -> Vec<u64> {
        events
            .iter()
            .filter_map(FeedEvent::as_market)
            .filter_map(|e| e.sequence_number)
            .collect()
    }

    #[test]
    fn test_gap_reported_before_event() {
        let mut pipeline = pipeline();
        let payloads: Vec<_> = [1, 2, 3, 7, 8]
            .iter()
            .enumerate()
            .map(|(i, &seq)| payload((i == 0).then_some("FNBB-EQ"), 1000 + i as i64, seq))
            .collect();

        let mut out = Vec::new();
        pipeline.process_datagram(&datagram(&payloads), &mut out);

        assert_eq!(sequences(&out), vec![1, 2, 3, 7, 8]);
        let gap_index = out
            .iter()
            .position(|e| matches!(e, FeedEvent::Recovery(_)))
            .unwrap();
        let FeedEvent::Recovery(gap) = &out[gap_index] else {
            unreachable!()
        };
        assert_eq!((gap.from_seq, gap.to_seq), (4, 6));
        assert_eq!(
            out[gap_index + 1].as_market().and_then(|e| e.sequence_number),
            Some(7)
        );

        let market = out[4].as_market().unwrap();
        assert_eq!(market.symbol.map(|s| s.to_string()).as_deref(), Some("FNBB-EQ"));
        assert_eq!(market.entry_type, EntryType::Bid);
        assert_eq!(pipeline.stats().payloads, 5);
        assert_eq!(pipeline.stats().decoded, 5);
    }

    #[test]
    fn test_bad_payload_is_skipped() {
        let mut pipeline = pipeline();
        let truncated = payload(Some("FNBB-EQ"), 1, 1)[..3].to_vec();
        let mut out = Vec::new();
        pipeline.process_datagram(
            &datagram(&[truncated, payload(Some("FNBB-EQ"), 1, 2)]),
            &mut out,
        );

        assert_eq!(sequences(&out), vec![2]);
        assert_eq!(pipeline.stats().discarded, 1);
    }

    #[test]
    fn test_frame_split_across_datagrams() {
        let mut pipeline = pipeline();
        let bytes = datagram(&[payload(Some("FNBB-EQ"), 5, 1)]);
        let (head, tail) = bytes.split_at(4);

        let mut out = Vec::new();
        pipeline.process_datagram(head, &mut out);
        assert!(out.is_empty());
        pipeline.process_datagram(tail, &mut out);
        assert_eq!(sequences(&out), vec![1]);
        assert_eq!(pipeline.stats().packets, 2);
    }

    #[test]
    fn test_duplicate_discarded() {
        let mut pipeline = pipeline().with_sequence_baseline(4);
        let mut out = Vec::new();
        pipeline.process_datagram(
            &datagram(&[
                payload(Some("FNBB-EQ"), 1, 5),
                payload(None, 1, 5),
                payload(None, 1, 6),
            ]),
            &mut out,
        );
        assert_eq!(sequences(&out), vec![5, 6]);
        assert_eq!(pipeline.stats().duplicates, 1);
        assert_eq!(pipeline.sequences().last_channel(), Some(6));
    }

    fn instrument_pipeline() -> IncrementalPipeline {
        let catalog = TemplateCatalog::new()
            .with_template(Template::new(
                71,
                "InstrumentIncremental",
                vec![
                    FieldDescriptor::new(55, "Symbol", WireType::Ascii),
                    FieldDescriptor::new(1181, "ApplSeqNum", WireType::UnsignedInt),
                    FieldDescriptor::new(83, "RptSeq", WireType::UnsignedInt),
                ],
            ))
            .unwrap();
        let decoder = MessageDecoder::new(Arc::new(catalog), &DecoderConfig::default()).unwrap();
        IncrementalPipeline::new(decoder)
    }

    fn instrument_payload(symbol: &str, seq: u64, rpt_seq: u64) -> Vec<u8> {
        let mut enc = FastEncoder::new();
        enc.encode_pmap(&[]);
        enc.encode_uint(71);
        enc.encode_ascii(symbol);
        enc.encode_uint(seq);
        enc.encode_uint(rpt_seq);
        enc.finish().to_vec()
    }

    #[tokio::test]
    async fn test_instrument_gap_requests_single_instrument_snapshot() {
        let mut pipeline = instrument_pipeline();
        let mut out = Vec::new();
        pipeline.process_datagram(
            &datagram(&[
                instrument_payload("FNBB-EQ", 1, 10),
                instrument_payload("ABSA-EQ", 2, 20),
                instrument_payload("FNBB-EQ", 3, 13),
            ]),
            &mut out,
        );

        assert_eq!(sequences(&out), vec![1, 2, 3]);
        let gaps: Vec<_> = out
            .iter()
            .filter_map(|e| match e {
                FeedEvent::Recovery(gap) => Some(gap.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].symbol.map(|s| s.to_string()).as_deref(), Some("FNBB-EQ"));
        assert_eq!((gaps[0].from_seq, gaps[0].to_seq), (11, 12));

        let (command_tx, command_rx) = mpsc::channel(4);
        let (request_tx, mut request_rx) = mpsc::channel(4);
        let task = tokio::spawn(run_recovery(
            command_rx,
            request_tx,
            CancellationToken::new(),
        ));
        command_tx
            .send(RecoveryCommand::Gap(gaps[0].clone()))
            .await
            .unwrap();

        let request = request_rx.recv().await.unwrap();
        assert_eq!(request.msg_type(), Some(MsgType::MarketDataRequest));
        assert_eq!(request.get(tags::NO_RELATED_SYM), Some("1"));
        assert_eq!(request.get(tags::SYMBOL), Some("FNBB-EQ"));

        drop(command_tx);
        let coordinator = task.await.unwrap();
        assert_eq!(coordinator.instrument_requests(), 1);
        assert_eq!(coordinator.full_book_requests(), 0);
    }

    #[tokio::test]
    async fn test_run_multicast_forwards_events_and_gaps() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let (recovery_tx, mut recovery_rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_multicast(
            socket,
            pipeline(),
            events_tx,
            recovery_tx,
            cancel.clone(),
        ));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let bytes = datagram(&[payload(Some("FNBB-EQ"), 1, 1), payload(None, 2, 3)]);
        sender.send_to(&bytes, addr).await.unwrap();

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(events_rx.recv().await.unwrap());
        }
        assert_eq!(sequences(&received), vec![1, 3]);
        assert!(matches!(received[1], FeedEvent::Recovery(_)));

        let Some(RecoveryCommand::Gap(gap)) = recovery_rx.recv().await else {
            panic!("expected a gap command");
        };
        assert_eq!((gap.from_seq, gap.to_seq), (2, 2));

        cancel.cancel();
        let stats = task.await.unwrap().unwrap();
        assert_eq!(stats.packets, 1);
        assert_eq!(stats.payloads, 2);
    }

    #[tokio::test]
    async fn test_receive_error_closes_channel() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let unreachable = std::net::UdpSocket::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        socket.connect(unreachable).await.unwrap();
        socket.send(b"ping").await.unwrap();

        let (events_tx, mut events_rx) = mpsc::channel(4);
        let (recovery_tx, _recovery_rx) = mpsc::channel(4);
        let task = tokio::spawn(run_multicast(
            socket,
            pipeline(),
            events_tx,
            recovery_tx,
            CancellationToken::new(),
        ));

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), events_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            FeedEvent::ChannelClosed {
                channel: Channel::Incremental,
                ..
            }
        ));
        let result = task.await.unwrap();
        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
