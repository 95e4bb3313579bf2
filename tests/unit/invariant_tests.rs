//! Property-based tests for book invariants under arbitrary operation mixes

use lob_engine::{Order, OrderBook, OrderId, OrderType, Side};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Prices on a coarse grid so independent orders often share levels
fn arb_price() -> impl Strategy<Value = Decimal> {
    (90i64..110i64).prop_map(Decimal::from)
}

fn arb_size() -> impl Strategy<Value = Decimal> {
    (1i64..1_000i64).prop_map(Decimal::from)
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn arb_order() -> impl Strategy<Value = (Decimal, Decimal, Side)> {
    (arb_price(), arb_size(), arb_side())
}

fn place(book: &mut OrderBook, (price, size, side): (Decimal, Decimal, Side)) -> OrderId {
    let order = Order::new(price, size, side, OrderType::Limit);
    let id = order.id;
    book.add_order(order).expect("fresh id never collides");
    id
}

/// Side volume must equal the sum of remaining sizes of resting orders.
fn side_volume_consistent(book: &OrderBook, ids: &[OrderId]) -> bool {
    let (mut bid_sum, mut ask_sum) = (Decimal::ZERO, Decimal::ZERO);
    for id in ids {
        if let Some(order) = book.get_order(*id) {
            match order.side {
                Side::Buy => bid_sum += order.remaining(),
                Side::Sell => ask_sum += order.remaining(),
            }
        }
    }
    bid_sum == book.total_bid_volume() && ask_sum == book.total_ask_volume()
}

#[cfg(test)]
mod aggregate_invariants {
    use super::*;

    proptest! {
        #[test]
        fn prop_volumes_track_placements(orders in prop::collection::vec(arb_order(), 1..40)) {
            let mut book = OrderBook::new("PROP");
            let ids: Vec<OrderId> = orders.into_iter().map(|o| place(&mut book, o)).collect();

            prop_assert!(side_volume_consistent(&book, &ids));
            prop_assert_eq!(book.bid_order_count() + book.ask_order_count(), ids.len());
        }

        #[test]
        fn prop_volumes_survive_cancels(
            orders in prop::collection::vec(arb_order(), 1..40),
            cancel_mask in prop::collection::vec(any::<bool>(), 1..40),
        ) {
            let mut book = OrderBook::new("PROP");
            let ids: Vec<OrderId> = orders.into_iter().map(|o| place(&mut book, o)).collect();

            let mut live = ids.len();
            for (id, cancel) in ids.iter().zip(cancel_mask) {
                if cancel {
                    prop_assert!(book.cancel_order(*id).is_ok());
                    prop_assert!(book.get_order(*id).is_none());
                    live -= 1;
                }
            }

            prop_assert!(side_volume_consistent(&book, &ids));
            prop_assert_eq!(book.bid_order_count() + book.ask_order_count(), live);
        }

        #[test]
        fn prop_volumes_survive_matching(
            orders in prop::collection::vec(arb_order(), 1..40),
            taker_side in arb_side(),
            taker_size in arb_size(),
        ) {
            let mut book = OrderBook::new("PROP");
            let ids: Vec<OrderId> = orders.into_iter().map(|o| place(&mut book, o)).collect();
            let opposing = match taker_side {
                Side::Buy => book.total_ask_volume(),
                Side::Sell => book.total_bid_volume(),
            };

            let result = book.match_market_order(taker_side, taker_size);

            prop_assert_eq!(result.matched + result.remaining, result.requested);
            prop_assert_eq!(result.matched, taker_size.min(opposing));
            prop_assert_eq!(result.is_complete, result.remaining == Decimal::ZERO);
            prop_assert!(side_volume_consistent(&book, &ids));
        }
    }
}

#[cfg(test)]
mod priority_invariants {
    use super::*;

    proptest! {
        #[test]
        fn prop_best_price_wins(orders in prop::collection::vec(arb_order(), 1..30)) {
            let mut book = OrderBook::new("PROP");
            let mut best_bid: Option<Decimal> = None;
            let mut best_ask: Option<Decimal> = None;
            for order in orders {
                match order.2 {
                    Side::Buy => best_bid = Some(best_bid.map_or(order.0, |b| b.max(order.0))),
                    Side::Sell => best_ask = Some(best_ask.map_or(order.0, |a| a.min(order.0))),
                }
                place(&mut book, order);
            }

            prop_assert_eq!(book.best_bid().map(|(price, _)| price), best_bid);
            prop_assert_eq!(book.best_ask().map(|(price, _)| price), best_ask);
        }

        #[test]
        fn prop_fills_follow_price_time_priority(
            sizes in prop::collection::vec(arb_size(), 2..10),
            taker_fraction in 1u32..100,
        ) {
            let mut book = OrderBook::new("PROP");
            let price = Decimal::from(100);
            let ids: Vec<OrderId> = sizes
                .iter()
                .map(|&size| place(&mut book, (price, size, Side::Sell)))
                .collect();
            let total: Decimal = sizes.iter().sum();
            let taker_size = total * Decimal::from(taker_fraction) / Decimal::from(100);

            let result = book.match_market_order(Side::Buy, taker_size);

            // Completely filled orders must be an ordered prefix of arrival order
            let filled: Vec<OrderId> = result.filled_orders.iter().map(|o| o.id).collect();
            prop_assert_eq!(&filled[..], &ids[..filled.len()]);
            // Every later order is untouched except possibly the first survivor
            for id in ids.iter().skip(filled.len() + 1) {
                let order = book.get_order(*id).expect("untouched order rests");
                prop_assert_eq!(order.filled, Decimal::ZERO);
            }
        }

        #[test]
        fn prop_resize_never_loses_queue_position(
            front_size in arb_size(),
            back_size in arb_size(),
            new_front_size in arb_size(),
        ) {
            let mut book = OrderBook::new("PROP");
            let price = Decimal::from(100);
            let front = place(&mut book, (price, front_size, Side::Sell));
            let back = place(&mut book, (price, back_size, Side::Sell));

            prop_assume!(new_front_size != front_size);
            book.update_order(front, new_front_size).expect("nothing filled yet");

            let result = book.match_market_order(Side::Buy, new_front_size);
            prop_assert_eq!(result.filled_orders.len(), 1);
            prop_assert_eq!(result.filled_orders[0].id, front);
            prop_assert_eq!(
                book.get_order(back).expect("back order still rests").remaining(),
                back_size
            );
        }
    }
}

#[cfg(test)]
mod quote_invariants {
    use super::*;

    proptest! {
        #[test]
        fn prop_mid_and_spread_consistent(
            bid in arb_order().prop_map(|(p, s, _)| (p, s, Side::Buy)),
            ask in arb_order().prop_map(|(p, s, _)| (p, s, Side::Sell)),
        ) {
            let mut book = OrderBook::new("PROP");
            place(&mut book, bid);
            place(&mut book, ask);

            let two = Decimal::from(2);
            prop_assert_eq!(book.mid_price(), (bid.0 + ask.0) / two);
            prop_assert_eq!(book.spread(), ask.0 - bid.0);
        }

        #[test]
        fn prop_one_sided_book_quotes_zero(order in arb_order()) {
            let mut book = OrderBook::new("PROP");
            place(&mut book, order);

            prop_assert_eq!(book.mid_price(), Decimal::ZERO);
            prop_assert_eq!(book.spread(), Decimal::ZERO);
        }
    }
}

#[cfg(test)]
mod snapshot_invariants {
    use super::*;
    use lob_engine::{LevelSnapshot, OrderBookManager, SnapshotPayload};

    /// (price, size) ladder; rebuilt books collapse each level to one order,
    /// so order counts are not comparable across a rebuild
    fn geometry(levels: &[LevelSnapshot]) -> Vec<(Decimal, Decimal)> {
        levels.iter().map(|level| (level.price, level.size)).collect()
    }

    proptest! {
        #[test]
        fn prop_snapshot_rebuild_is_idempotent(orders in prop::collection::vec(arb_order(), 1..30)) {
            let mut book = OrderBook::new("PROP");
            for order in orders {
                place(&mut book, order);
            }
            let first = book.snapshot(usize::MAX);

            let manager = OrderBookManager::new();
            let payload = SnapshotPayload::new(
                "PROP",
                geometry(&first.bids),
                geometry(&first.asks),
            );
            manager.process_snapshot(payload.clone()).expect("rebuild");
            let second = manager.book_snapshot("PROP", usize::MAX);
            manager.process_snapshot(payload).expect("rebuild again");
            let third = manager.book_snapshot("PROP", usize::MAX);

            prop_assert_eq!(geometry(&second.bids), geometry(&first.bids));
            prop_assert_eq!(geometry(&second.asks), geometry(&first.asks));
            prop_assert_eq!(&third.bids, &second.bids);
            prop_assert_eq!(&third.asks, &second.asks);
        }
    }
}
