#[cfg(test)]
mod tests_snapshot_restore {
    use lob_engine::{
        Order, OrderBook, OrderBookError, OrderBookManager, OrderType, Side, SnapshotPackage,
        SnapshotPayload,
    };
    use rust_decimal_macros::dec;

    fn populated_book(symbol: &str) -> OrderBook {
        let mut book = OrderBook::new(symbol);
        let levels = [
            (dec!(10000), dec!(5), Side::Buy),
            (dec!(9900), dec!(7), Side::Buy),
            (dec!(10100), dec!(4), Side::Sell),
            (dec!(10200), dec!(6), Side::Sell),
        ];
        for (price, size, side) in levels {
            book.add_order(Order::new(price, size, side, OrderType::Limit))
                .expect("seed order");
        }
        book
    }

    #[test]
    fn snapshot_package_round_trip_restores_book_shape() {
        let original = populated_book("TEST");
        let package = SnapshotPackage::new(original.snapshot(10)).expect("snapshot package");

        let json = package.to_json().expect("serialize package to json");
        let restored = SnapshotPackage::from_json(&json)
            .expect("parse package json")
            .into_snapshot()
            .expect("validate package");

        assert_eq!(restored.symbol, "TEST");
        assert_eq!(restored.best_bid(), Some((dec!(10000), dec!(5))));
        assert_eq!(restored.best_ask(), Some((dec!(10100), dec!(4))));
        assert_eq!(restored.total_bid_volume(), dec!(12));
        assert_eq!(restored.total_ask_volume(), dec!(10));
        assert_eq!(restored.mid_price(), dec!(10050));
        assert_eq!(restored.sequence, 4);
    }

    #[test]
    fn validated_snapshot_rebuilds_a_matching_book() {
        let snapshot = SnapshotPackage::new(populated_book("BTC/USD").snapshot(10))
            .expect("snapshot package")
            .into_snapshot()
            .expect("validate package");

        let manager = OrderBookManager::new();
        let payload = SnapshotPayload::new(
            snapshot.symbol.clone(),
            snapshot.bids.iter().map(|l| (l.price, l.size)).collect(),
            snapshot.asks.iter().map(|l| (l.price, l.size)).collect(),
        )
        .with_sequence(snapshot.sequence)
        .with_timestamp(snapshot.timestamp);
        manager.process_snapshot(payload).expect("rebuild book");

        let rebuilt = manager.book_snapshot("BTC/USD", 10);
        assert_eq!(rebuilt.symbol, snapshot.symbol);
        assert_eq!(rebuilt.sequence, snapshot.sequence);
        assert_eq!(rebuilt.timestamp, snapshot.timestamp);
        assert_eq!(rebuilt.best_bid(), snapshot.best_bid());
        assert_eq!(rebuilt.best_ask(), snapshot.best_ask());
        assert_eq!(rebuilt.mid_price(), snapshot.mid_price());
        assert_eq!(rebuilt.spread(), snapshot.spread());
    }

    #[test]
    fn restore_rejects_checksum_mismatch() {
        let mut tampered =
            SnapshotPackage::new(populated_book("CHK").snapshot(10)).expect("snapshot package");
        tampered.checksum = "deadbeef".to_string();

        let err = tampered
            .into_snapshot()
            .expect_err("checksum mismatch should be detected");
        assert!(matches!(err, OrderBookError::ChecksumMismatch { .. }));
    }

    #[test]
    fn tampered_payload_fails_validation() {
        let package =
            SnapshotPackage::new(populated_book("CHK").snapshot(10)).expect("snapshot package");
        let json = package.to_json().expect("serialize package to json");

        // Flip a level size inside the serialized snapshot
        let tampered_json = json.replace("\"size\":\"5\"", "\"size\":\"50\"");
        assert_ne!(tampered_json, json);

        let parsed = SnapshotPackage::from_json(&tampered_json).expect("still well-formed json");
        let err = parsed
            .validate()
            .expect_err("checksum must cover level data");
        assert!(matches!(err, OrderBookError::ChecksumMismatch { .. }));
    }

    #[test]
    fn restore_rejects_version_mismatch() {
        let mut package =
            SnapshotPackage::new(populated_book("VER").snapshot(10)).expect("snapshot package");
        package.version += 1;

        let err = package
            .into_snapshot()
            .expect_err("version mismatch should be rejected");
        match err {
            OrderBookError::UnsupportedVersion { version, expected } => {
                assert_eq!(version, expected + 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_json_reports_deserialization_error() {
        let err = SnapshotPackage::from_json("{not json").expect_err("parse failure");
        assert!(matches!(err, OrderBookError::DeserializationError { .. }));
    }

    #[test]
    fn depth_limited_package_captures_only_top_levels() {
        let snapshot = SnapshotPackage::new(populated_book("TOP").snapshot(1))
            .expect("snapshot package")
            .into_snapshot()
            .expect("validate package");

        assert_eq!(snapshot.bids.len(), 1);
        assert_eq!(snapshot.asks.len(), 1);
        assert_eq!(snapshot.best_bid(), Some((dec!(10000), dec!(5))));
        // Totals reflect only the captured depth
        assert_eq!(snapshot.total_bid_volume(), dec!(5));
    }
}
