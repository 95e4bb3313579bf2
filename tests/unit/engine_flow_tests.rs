//! End-to-end flows: feed events in, trades and analytics out

use lob_engine::{
    EventOutcome, MetricFlags, OrderBookManager, OrderEvent, OrderId, Side, SignalKind,
    SnapshotPayload, TimeSeriesAnalytics,
};
use rust_decimal_macros::dec;

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_symbol(manager: &OrderBookManager, symbol: &str) {
        let bids = [
            (dec!(99), dec!(30)),
            (dec!(98), dec!(20)),
            (dec!(97), dec!(10)),
        ];
        let asks = [(dec!(101), dec!(15)), (dec!(102), dec!(10))];
        for (price, size) in bids {
            manager
                .process_order_event(OrderEvent::add(symbol, OrderId::new(), price, size, Side::Buy))
                .expect("seed bid");
        }
        for (price, size) in asks {
            manager
                .process_order_event(OrderEvent::add(
                    symbol,
                    OrderId::new(),
                    price,
                    size,
                    Side::Sell,
                ))
                .expect("seed ask");
        }
    }

    #[test]
    fn feed_to_trade_channel_round_trip() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let manager = OrderBookManager::with_trade_channel(sender);
        seed_symbol(&manager, "BTC/USD");

        // Two prints: a sell aggressor consumes asks, a buy aggressor bids
        let first = manager
            .process_order_event(OrderEvent::trade("BTC/USD", Side::Sell, dec!(10)))
            .expect("first trade");
        let second = manager
            .process_order_event(OrderEvent::trade("BTC/USD", Side::Buy, dec!(35)))
            .expect("second trade");

        for outcome in [first, second] {
            assert!(matches!(outcome, EventOutcome::Traded(_)));
        }

        let trades: Vec<_> = receiver.try_iter().collect();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].matched, dec!(10));
        assert_eq!(trades[0].avg_price, dec!(101));
        // 30 @ 99 then 5 @ 98: 3460 / 35
        assert_eq!(trades[1].matched, dec!(35));
        assert_eq!(trades[1].avg_price, dec!(3460) / dec!(35));

        let snapshot = manager.book_snapshot("BTC/USD", 10);
        assert_eq!(snapshot.best_bid(), Some((dec!(98), dec!(15))));
        assert_eq!(snapshot.best_ask(), Some((dec!(101), dec!(5))));
    }

    #[test]
    fn enriched_snapshot_over_the_manager() {
        let manager = OrderBookManager::new();
        seed_symbol(&manager, "ETH/USD");

        let enriched = manager
            .with_book("ETH/USD", |book| {
                book.enriched_snapshot(5, MetricFlags::BASIC | MetricFlags::SIGNALS)
            })
            .expect("book exists");

        let basic = enriched.basic.expect("basic metrics requested");
        assert!(enriched.depth.is_none());
        assert!(enriched.liquidity.is_none());
        assert!(enriched.imbalance.is_none());
        assert!((basic.mid_price - 100.0).abs() < 1e-9);
        // 60 bids vs 25 asks: clearly bid-heavy
        assert!(basic.volume_imbalance > 0.2);

        let signals = enriched.signals.expect("signals requested");
        assert_eq!(signals.overall.kind, SignalKind::Buy);
        assert_eq!(enriched.snapshot.bids.len(), 3);
        assert_eq!(enriched.snapshot.asks.len(), 2);
    }

    #[test]
    fn history_accumulates_while_the_feed_replays() {
        let manager = OrderBookManager::new();
        seed_symbol(&manager, "BTC/USD");
        let mut analytics = TimeSeriesAnalytics::default();

        for size in [dec!(5), dec!(10), dec!(15)] {
            manager
                .process_order_event(OrderEvent::trade("BTC/USD", Side::Buy, size))
                .expect("trade");
            manager
                .with_book("BTC/USD", |book| analytics.record(book))
                .expect("book exists");
        }

        assert_eq!(analytics.len(), 3);
        let imbalances: Vec<f64> = analytics
            .history()
            .iter()
            .map(|record| record.volume_imbalance)
            .collect();
        // Buy-aggressor prints eat the bid side, so imbalance keeps falling
        assert!(imbalances.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn snapshot_reload_resets_a_drifted_book() {
        let manager = OrderBookManager::new();
        seed_symbol(&manager, "BTC/USD");
        manager
            .process_order_event(OrderEvent::trade("BTC/USD", Side::Buy, dec!(55)))
            .expect("drift the book");

        let authoritative = SnapshotPayload::new(
            "BTC/USD",
            vec![(dec!(99), dec!(30)), (dec!(98), dec!(20))],
            vec![(dec!(101), dec!(15))],
        )
        .with_sequence(9_000)
        .with_timestamp(1_700_000_000_000);
        manager.process_snapshot(authoritative).expect("reload");

        let snapshot = manager.book_snapshot("BTC/USD", 10);
        assert_eq!(snapshot.sequence, 9_000);
        assert_eq!(snapshot.timestamp, 1_700_000_000_000);
        assert_eq!(snapshot.best_bid(), Some((dec!(99), dec!(30))));
        assert_eq!(snapshot.total_bid_volume(), dec!(50));
        assert_eq!(snapshot.total_ask_volume(), dec!(15));
    }

    #[tokio::test]
    async fn tokio_channel_collects_trades_across_symbols() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let manager = OrderBookManager::with_tokio_trade_channel(sender);
        seed_symbol(&manager, "BTC/USD");
        seed_symbol(&manager, "ETH/USD");

        manager.submit_market_order("BTC/USD", Side::Buy, dec!(5));
        manager.submit_market_order("ETH/USD", Side::Sell, dec!(7));

        let first = receiver.recv().await.expect("first trade");
        let second = receiver.recv().await.expect("second trade");
        assert_eq!(first.symbol, "BTC/USD");
        assert_eq!(first.side, Side::Buy);
        assert_eq!(second.symbol, "ETH/USD");
        assert_eq!(second.matched, dec!(7));
    }
}
