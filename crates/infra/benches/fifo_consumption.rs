//! FIFO consumption benchmark: drain a product spread across many lots.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use almoner_core::{LotId, LotItemId, ProductId};
use almoner_infra::InMemoryLotStore;
use almoner_stock::lot::{Lot, LotItem, UnitOfMeasure};
use almoner_stock::store::LotStore;
use almoner_stock::FifoConsumer;

fn seeded_store(product: ProductId, lots: u64, per_lot: u32) -> Arc<InMemoryLotStore> {
    let store = Arc::new(InMemoryLotStore::new());
    let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    for i in 0..lots {
        let id = LotId::new();
        let lot = Lot::new(
            id,
            base + Days::new(i),
            per_lot,
            UnitOfMeasure::Unit,
            None,
        )
        .unwrap();
        let item = LotItem::new(LotItemId::new(), id, product, per_lot).unwrap();
        store.insert(lot, vec![item]).unwrap();
    }
    store
}

fn fifo_consumption(c: &mut Criterion) {
    let product = ProductId::new();

    c.bench_function("consume_500_across_100_lots", |b| {
        b.iter_batched(
            || seeded_store(product, 100, 10),
            |store| FifoConsumer::new(store).consume(product, 500).unwrap(),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("consume_10_from_oldest_of_100_lots", |b| {
        b.iter_batched(
            || seeded_store(product, 100, 10),
            |store| FifoConsumer::new(store).consume(product, 10).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, fifo_consumption);
criterion_main!(benches);
