use photo_grid::assets::{Asset, AssetCollection};
use photo_grid::cache::{ContentMode, PixelSize, RequestOptions, ThumbnailCache};
use photo_grid::geometry::Rect;
use photo_grid::layout::GridLayout;
use photo_grid::preheat::PreheatWindow;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start(Vec<String>),
    Stop(Vec<String>),
    StopAll,
}

#[derive(Default)]
struct RecordingCache {
    calls: Vec<Call>,
    options_seen: Vec<RequestOptions>,
}

impl ThumbnailCache for RecordingCache {
    fn start_caching(&mut self, assets: &[Asset], options: RequestOptions) {
        self.options_seen.push(options);
        self.calls.push(Call::Start(ids_of(assets)));
    }

    fn stop_caching(&mut self, assets: &[Asset], options: RequestOptions) {
        self.options_seen.push(options);
        self.calls.push(Call::Stop(ids_of(assets)));
    }

    fn stop_caching_all(&mut self) {
        self.calls.push(Call::StopAll);
    }
}

fn ids_of(assets: &[Asset]) -> Vec<String> {
    assets.iter().map(|a| a.id.to_string()).collect()
}

fn ids(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("asset-{i:04}")).collect()
}

fn collection(count: usize) -> AssetCollection {
    AssetCollection::new((0..count).map(|i| Asset::photo(format!("asset-{i:04}"))).collect())
}

fn options() -> RequestOptions {
    RequestOptions {
        target_size: PixelSize::new(256, 256),
        mode: ContentMode::AspectFill,
    }
}

// One 100pt column per 100pt row: item i spans y in [100*i, 100*i + 100).
fn single_column() -> GridLayout {
    GridLayout::new(1, 100.0, 100.0, 0.0)
}

#[test]
fn reset_is_idempotent() {
    let layout = single_column();
    let assets = collection(100);
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 0.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    assert_ne!(window.previous_region(), Rect::ZERO);

    window.reset(&mut cache);
    assert_eq!(window.previous_region(), Rect::ZERO);
    assert_eq!(cache.calls.last(), Some(&Call::StopAll));

    window.reset(&mut cache);
    assert_eq!(window.previous_region(), Rect::ZERO);
    assert_eq!(cache.calls.last(), Some(&Call::StopAll));
}

#[test]
fn moves_within_a_third_of_viewport_height_are_ignored() {
    let layout = single_column();
    let assets = collection(100);
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 0.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    let committed = window.previous_region();
    assert_eq!(committed, Rect::new(0.0, -150.0, 100.0, 600.0));
    cache.calls.clear();

    // Exactly a third of the viewport height: still below the threshold.
    window.update(Rect::new(0.0, 100.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    assert!(cache.calls.is_empty());
    assert_eq!(window.previous_region(), committed);

    // A hair past the threshold recomputes and commits.
    window.update(Rect::new(0.0, 100.5, 100.0, 300.0), true, &layout, &assets, &mut cache);
    assert_eq!(cache.calls, vec![Call::Start(ids(4..6))]);
    assert_eq!(window.previous_region(), Rect::new(0.0, -49.5, 100.0, 600.0));
}

#[test]
fn off_surface_updates_are_inert() {
    let layout = single_column();
    let assets = collection(100);
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 5000.0, 100.0, 300.0), false, &layout, &assets, &mut cache);
    assert!(cache.calls.is_empty());
    assert_eq!(window.previous_region(), Rect::ZERO);

    // Same viewport while on screen does the work the inert call skipped.
    window.update(Rect::new(0.0, 5000.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    assert_eq!(cache.calls.len(), 1);
    assert!(matches!(cache.calls[0], Call::Start(_)));
}

#[test]
fn scrolling_down_starts_below_and_stops_above() {
    let layout = single_column();
    let assets = collection(1000);
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 0.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    cache.calls.clear();

    // Down by 200: window [-150, 450) becomes [50, 650).
    window.update(Rect::new(0.0, 200.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    assert_eq!(
        cache.calls,
        vec![Call::Start(ids(4..7)), Call::Stop(ids(0..1))]
    );
}

#[test]
fn disjoint_jump_swaps_the_window_wholesale() {
    let layout = single_column();
    let assets = collection(1000);
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 0.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    cache.calls.clear();

    // Far enough that the old and new windows share nothing.
    window.update(Rect::new(0.0, 2000.0, 100.0, 300.0), true, &layout, &assets, &mut cache);
    assert_eq!(
        cache.calls,
        vec![Call::Start(ids(18..25)), Call::Stop(ids(0..5))]
    );
}

#[test]
fn first_pass_issues_one_start_and_no_stop() {
    // 1000 assets in a 4-column grid of 25x100 cells; viewport 100x600.
    let layout = GridLayout::new(4, 25.0, 100.0, 0.0);
    let assets = collection(1000);
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 0.0, 100.0, 600.0), true, &layout, &assets, &mut cache);

    // The window doubles the viewport: [-300, 900), clipped to rows 0..9.
    assert_eq!(cache.calls, vec![Call::Start(ids(0..36))]);
    assert_eq!(window.previous_region(), Rect::new(0.0, -300.0, 100.0, 1200.0));
    assert!(cache.options_seen.iter().all(|&seen| seen == options()));
}

#[test]
fn shorter_collection_resolves_partially_after_reset() {
    let layout = single_column();
    let mut cache = RecordingCache::default();
    let mut window = PreheatWindow::new(options());

    window.update(Rect::new(0.0, 49_700.0, 100.0, 600.0), true, &layout, &collection(1000), &mut cache);
    cache.calls.clear();

    // The library shrank underneath us; indices past the end just drop out.
    window.reset(&mut cache);
    cache.calls.clear();
    window.update(Rect::new(0.0, 49_700.0, 100.0, 600.0), true, &layout, &collection(500), &mut cache);

    assert_eq!(cache.calls, vec![Call::Start(ids(494..500))]);
}
