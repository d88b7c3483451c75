//! Benchmarks for slot extraction and FAQ matching.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use carbonscore::config::Thresholds;
use carbonscore::embedding::EmbeddingProvider;
use carbonscore::embedding::lexicon::LexiconEmbeddings;
use carbonscore::extract::{Extractors, Slot};
use carbonscore::faq::{FaqCatalog, SemanticMatcher};

const DIM: usize = 300;

fn provider() -> Arc<dyn EmbeddingProvider> {
    Arc::new(LexiconEmbeddings::hashed_only(DIM))
}

fn bench_quantities(c: &mut Criterion) {
    let ex = Extractors::new(provider(), Thresholds::default());

    c.bench_function("car_usage_sentence", |bench| {
        bench.iter(|| {
            black_box(ex.extract(
                Slot::CarUsage,
                black_box("5km par semaine en moyenne, avec 4 autres collègues"),
            ))
        })
    });

    c.bench_function("flat_surface_rooms", |bench| {
        bench.iter(|| {
            black_box(ex.extract(
                Slot::FlatSurface,
                black_box("une chambre de 12 m2, un salon de 30 m2 et une cuisine de 8m2"),
            ))
        })
    });
}

fn bench_categories(c: &mut Criterion) {
    let ex = Extractors::new(provider(), Thresholds::default());

    c.bench_function("heating_sources", |bench| {
        bench.iter(|| {
            black_box(ex.extract(
                Slot::HeatingSources,
                black_box("je me chauffe au gaz et un peu au bois l'hiver"),
            ))
        })
    });

    c.bench_function("diet", |bench| {
        bench.iter(|| {
            black_box(ex.extract(
                Slot::Diet,
                black_box("Je mange de tout et de temps en temps je suis vegan"),
            ))
        })
    });
}

fn bench_faq(c: &mut Criterion) {
    let catalog = FaqCatalog::bundled().unwrap();
    let matcher = SemanticMatcher::new(provider(), catalog, Thresholds::FAQ);

    c.bench_function("faq_bundled_catalog", |bench| {
        bench.iter(|| black_box(matcher.answer(black_box("comment réduire mon empreinte carbone"))))
    });
}

criterion_group!(benches, bench_quantities, bench_categories, bench_faq);
criterion_main!(benches);
