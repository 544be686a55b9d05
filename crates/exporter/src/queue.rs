//! Single-producer, single-consumer packet queue per category.

use crossbeam_channel::{unbounded, Receiver, Sender};
use map_common::MapCategory;
use serde::Serialize;

use crate::error::QueueError;
use crate::packet::CategoryPacket;

/// Counts of packets pushed by a producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub data_packets: u64,
    pub end_markers: u32,
}

/// Create a connected producer/consumer pair for a category.
pub fn category_queue(category: MapCategory) -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = unbounded();
    (
        QueueProducer {
            category,
            tx,
            stats: QueueStats::default(),
        },
        QueueConsumer { category, rx },
    )
}

/// Sending half, held by the scan.
#[derive(Debug)]
pub struct QueueProducer {
    category: MapCategory,
    tx: Sender<CategoryPacket>,
    stats: QueueStats,
}

impl QueueProducer {
    pub fn category(&self) -> MapCategory {
        self.category
    }

    /// Append a packet and wake the consumer.
    ///
    /// Nothing may follow an end marker.
    pub fn push(&mut self, packet: CategoryPacket) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed(self.category));
        }
        let is_end = packet.is_end();
        if is_end {
            self.stats.end_markers += 1;
        } else {
            self.stats.data_packets += 1;
        }
        self.tx
            .send(packet)
            .map_err(|_| QueueError::Disconnected(self.category))
    }

    /// Push the end marker. A second call fails with `Closed`.
    pub fn push_end(&mut self) -> Result<(), QueueError> {
        self.push(CategoryPacket::EndOfStream)
    }

    pub fn is_closed(&self) -> bool {
        self.stats.end_markers > 0
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }
}

/// Receiving half, owned by the category's worker.
#[derive(Debug)]
pub struct QueueConsumer {
    category: MapCategory,
    rx: Receiver<CategoryPacket>,
}

impl QueueConsumer {
    pub fn category(&self) -> MapCategory {
        self.category
    }

    /// Block until a packet is available.
    ///
    /// Fails with `Disconnected` once the producer is gone and the queue is
    /// drained.
    pub fn pop(&self) -> Result<CategoryPacket, QueueError> {
        self.rx
            .recv()
            .map_err(|_| QueueError::Disconnected(self.category))
    }

    /// Packets waiting to be popped.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Payload;
    use map_common::WorldCoord;
    use std::thread;

    fn data(x: u32) -> CategoryPacket {
        CategoryPacket::Data {
            coord: WorldCoord::new(x, 0),
            payload: Payload::Raw(vec![x as u16]),
        }
    }

    #[test]
    fn test_fifo_order() {
        let (mut tx, rx) = category_queue(MapCategory::Elevation);
        for x in 0..5 {
            tx.push(data(x)).unwrap();
        }
        tx.push_end().unwrap();
        assert_eq!(rx.pending(), 6);
        for x in 0..5 {
            assert_eq!(rx.pop().unwrap(), data(x));
        }
        assert!(rx.pop().unwrap().is_end());
        assert_eq!(tx.stats(), QueueStats { data_packets: 5, end_markers: 1 });
    }

    #[test]
    fn test_push_after_end_is_rejected() {
        let (mut tx, _rx) = category_queue(MapCategory::Biome);
        tx.push_end().unwrap();
        assert_eq!(tx.push(data(1)), Err(QueueError::Closed(MapCategory::Biome)));
        assert_eq!(tx.push_end(), Err(QueueError::Closed(MapCategory::Biome)));
        assert_eq!(tx.stats().end_markers, 1);
        assert_eq!(tx.stats().data_packets, 0);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let (mut tx, rx) = category_queue(MapCategory::Trading);
        let consumer = thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                match rx.pop().unwrap() {
                    CategoryPacket::Data { coord, .. } => seen.push(coord.x),
                    CategoryPacket::EndOfStream => break,
                }
            }
            seen
        });
        for x in 0..100 {
            tx.push(data(x)).unwrap();
        }
        tx.push_end().unwrap();
        assert_eq!(consumer.join().unwrap(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_dropped_producer_disconnects() {
        let (mut tx, rx) = category_queue(MapCategory::Sites);
        tx.push(data(0)).unwrap();
        drop(tx);
        assert!(rx.pop().is_ok());
        assert_eq!(rx.pop(), Err(QueueError::Disconnected(MapCategory::Sites)));
    }

    #[test]
    fn test_dropped_consumer_reports_disconnect() {
        let (mut tx, rx) = category_queue(MapCategory::Salinity);
        drop(rx);
        assert_eq!(tx.push(data(0)), Err(QueueError::Disconnected(MapCategory::Salinity)));
    }
}
