use lob_engine::{
    EventKind, Order, OrderBook, OrderBookError, OrderBookManager, OrderEvent, OrderId, OrderType,
    Side,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(price: Decimal, size: Decimal, side: Side) -> Order {
        Order::new(price, size, side, OrderType::Limit)
    }

    // --- Duplicate order ids ---

    #[test]
    fn test_duplicate_add_reports_conflicting_id() {
        let mut book = OrderBook::new("BTC/USD");
        let order = limit(dec!(100), dec!(5), Side::Buy);
        let id = order.id;
        book.add_order(order.clone()).unwrap();

        match book.add_order(order) {
            Err(OrderBookError::DuplicateOrder { id: conflicting }) => assert_eq!(conflicting, id),
            other => panic!("expected duplicate order error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_id_rejected_even_with_different_payload() {
        let mut book = OrderBook::new("BTC/USD");
        let order = limit(dec!(100), dec!(5), Side::Buy);
        book.add_order(order.clone()).unwrap();

        let mut resized = order;
        resized.size = dec!(50);
        assert!(book.add_order(resized).is_err());

        assert_eq!(book.total_bid_volume(), dec!(5));
        assert_eq!(book.sequence(), 1);
    }

    // --- Unknown order ids ---

    #[test]
    fn test_cancel_unknown_id_reports_the_id() {
        let mut book = OrderBook::new("BTC/USD");
        let missing = OrderId::new();

        match book.cancel_order(missing) {
            Err(OrderBookError::OrderNotFound { id }) => assert_eq!(id, missing),
            other => panic!("expected order not found, got {other:?}"),
        }
    }

    #[test]
    fn test_update_unknown_id_rejected() {
        let mut book = OrderBook::new("BTC/USD");
        assert!(matches!(
            book.update_order(OrderId::new(), dec!(5)),
            Err(OrderBookError::OrderNotFound { .. })
        ));
    }

    // --- Resize bounds ---

    #[test]
    fn test_resize_below_filled_reports_fill_state() {
        let mut book = OrderBook::new("BTC/USD");
        let order = limit(dec!(100), dec!(10), Side::Sell);
        let id = order.id;
        book.add_order(order).unwrap();
        book.match_market_order(Side::Buy, dec!(4));

        match book.update_order(id, dec!(3)) {
            Err(OrderBookError::InvalidSize {
                id: rejected,
                size,
                filled,
            }) => {
                assert_eq!(rejected, id);
                assert_eq!(size, dec!(3));
                assert_eq!(filled, dec!(4));
            }
            other => panic!("expected invalid size error, got {other:?}"),
        }

        // The resting order is untouched
        let order = book.get_order(id).unwrap();
        assert_eq!(order.size, dec!(10));
        assert_eq!(order.remaining(), dec!(6));
    }

    #[test]
    fn test_resize_to_exactly_filled_rejected() {
        let mut book = OrderBook::new("BTC/USD");
        let order = limit(dec!(100), dec!(10), Side::Sell);
        let id = order.id;
        book.add_order(order).unwrap();
        book.match_market_order(Side::Buy, dec!(4));

        assert!(book.update_order(id, dec!(4)).is_err());

        // Anything above the fill is accepted
        book.update_order(id, dec!(5)).unwrap();
        assert_eq!(book.best_ask(), Some((dec!(100), dec!(1))));
    }

    #[test]
    fn test_resize_to_zero_rejected_on_unfilled_order() {
        let mut book = OrderBook::new("BTC/USD");
        let order = limit(dec!(100), dec!(10), Side::Buy);
        let id = order.id;
        book.add_order(order).unwrap();

        match book.update_order(id, Decimal::ZERO) {
            Err(OrderBookError::InvalidSize { filled, .. }) => assert_eq!(filled, Decimal::ZERO),
            other => panic!("expected invalid size error, got {other:?}"),
        }
    }

    // --- Event field requirements ---

    #[test]
    fn test_add_event_requires_a_side() {
        let manager = OrderBookManager::new();
        let mut event = OrderEvent::add(
            "BTC/USD",
            OrderId::from_u64(1),
            dec!(100),
            dec!(5),
            Side::Buy,
        );
        event.side = None;

        match manager.process_order_event(event) {
            Err(OrderBookError::MissingEventField { kind, field }) => {
                assert_eq!(kind, EventKind::Add);
                assert_eq!(field, "side");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }

        // Field checks run before the book is created
        assert!(!manager.has_book("BTC/USD"));
    }

    #[test]
    fn test_cancel_event_requires_an_order_id() {
        let manager = OrderBookManager::new();
        let mut event = OrderEvent::cancel("BTC/USD", OrderId::from_u64(1));
        event.order_id = None;

        match manager.process_order_event(event) {
            Err(OrderBookError::MissingEventField { kind, field }) => {
                assert_eq!(kind, EventKind::Cancel);
                assert_eq!(field, "order_id");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_event_requires_a_size() {
        let manager = OrderBookManager::new();
        let mut event = OrderEvent::update("BTC/USD", OrderId::from_u64(1), dec!(5));
        event.size = None;

        match manager.process_order_event(event) {
            Err(OrderBookError::MissingEventField { kind, field }) => {
                assert_eq!(kind, EventKind::Update);
                assert_eq!(field, "size");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_trade_event_requires_a_size() {
        let manager = OrderBookManager::new();
        let mut event = OrderEvent::trade("BTC/USD", Side::Buy, dec!(5));
        event.size = None;

        match manager.process_order_event(event) {
            Err(OrderBookError::MissingEventField { kind, field }) => {
                assert_eq!(kind, EventKind::Trade);
                assert_eq!(field, "size");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    // --- Event kind dispatch ---

    #[test]
    fn test_unrecognized_kind_parses_then_fails_dispatch() {
        let manager = OrderBookManager::new();
        let event: OrderEvent =
            serde_json::from_str(r#"{"kind": "modify", "symbol": "BTC/USD"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Unknown);

        let err = manager.process_order_event(event).unwrap_err();
        assert_eq!(err.to_string(), "Unknown event kind: unknown");
    }

    // --- Error display ---

    #[test]
    fn test_not_found_display_names_the_id() {
        let mut book = OrderBook::new("BTC/USD");
        let missing = OrderId::new();
        let err = book.cancel_order(missing).unwrap_err();

        let msg = format!("{err}");
        assert!(msg.contains("Order not found"), "unexpected message: {msg}");
        assert!(
            msg.contains(&missing.to_string()),
            "should contain the id: {msg}"
        );
    }

    #[test]
    fn test_size_error_display_includes_fill_state() {
        let mut book = OrderBook::new("BTC/USD");
        let order = limit(dec!(100), dec!(10), Side::Sell);
        let id = order.id;
        book.add_order(order).unwrap();
        book.match_market_order(Side::Buy, dec!(4));

        let msg = book.update_order(id, dec!(3)).unwrap_err().to_string();
        assert!(msg.contains("must exceed"), "unexpected message: {msg}");
        assert!(msg.contains('3'), "should contain requested size: {msg}");
        assert!(msg.contains('4'), "should contain filled quantity: {msg}");
    }

    #[test]
    fn test_missing_field_display_names_kind_and_field() {
        let manager = OrderBookManager::new();
        let mut event = OrderEvent::trade("BTC/USD", Side::Sell, dec!(2));
        event.aggressor_side = None;

        let msg = manager.process_order_event(event).unwrap_err().to_string();
        assert!(msg.contains("trade"), "should name the kind: {msg}");
        assert!(
            msg.contains("`aggressor_side`"),
            "should name the field: {msg}"
        );
    }
}
