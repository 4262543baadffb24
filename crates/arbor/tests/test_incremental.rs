//! Frame-to-frame repaint decisions in incremental mode.

#[cfg(test)]
mod tests {
    use arbor::{
        DisplayNode, Error, Expanse, FrameOutcome, Rect, Renderer, RendererConfig, Result,
        measure::CachingMeasurer,
        style::Color,
        testing::{FixedMeasurer, TestBackend},
    };

    const RED: Color = Color::rgb(255, 0, 0);
    const SIZE: Expanse = Expanse { w: 800, h: 600 };

    /// A leaf at revision 0, or at revision 1 with a new color if edited.
    fn node(name: &str, edits: &[(&str, Color)]) -> DisplayNode {
        let (color, rev) = edits
            .iter()
            .find(|(n, _)| *n == name)
            .map_or((Color::WHITE, 0), |(_, c)| (*c, 1));
        DisplayNode::rect(color).with_key(name).with_revision(rev)
    }

    fn scene_ordered(order: &[&str], edits: &[(&str, Color)]) -> Vec<DisplayNode> {
        let items = order.iter().map(|n| node(n, edits).size(100, 20)).collect();
        vec![
            DisplayNode::rect(Color::BLACK).with_key("bg").size(800, 600),
            DisplayNode::vstack(items)
                .with_key("list")
                .at(10, 10)
                .size(200, 300),
            node("far", edits).at(700, 500).size(50, 50),
            node("ghost", edits).at(900, 0).size(10, 10),
        ]
    }

    fn scene(edits: &[(&str, Color)]) -> Vec<DisplayNode> {
        scene_ordered(&["a", "b", "c"], edits)
    }

    fn incremental() -> RendererConfig {
        RendererConfig {
            incremental: true,
            ..Default::default()
        }
    }

    #[test]
    fn first_frame_full_then_skip() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Full);
        assert_eq!(
            log.lock().unwrap().painted_keys(),
            vec!["bg", "list", "a", "b", "c", "far"]
        );
        backend.reset();
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Skipped);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(r.stats().skipped_frames, 1);
        Ok(())
    }

    #[test]
    fn single_change_is_scissored() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        backend.reset();

        let region = Rect::new(10, 30, 100, 20);
        assert_eq!(
            r.render(scene(&[("b", RED)]), SIZE, &mut backend)?,
            FrameOutcome::Partial(region)
        );
        let log = log.lock().unwrap();
        assert_eq!(log.scissors(), vec![Some(region), None]);
        assert_eq!(log.clears(), vec![Some(region)]);
        // The whole tree is repainted under the scissor.
        assert_eq!(log.paint_count(), 6);
        Ok(())
    }

    #[test]
    fn distant_changes_fall_back_to_full() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        backend.reset();
        assert_eq!(
            r.render(scene(&[("a", RED), ("far", RED)]), SIZE, &mut backend)?,
            FrameOutcome::Full
        );
        let log = log.lock().unwrap();
        assert!(log.scissors().is_empty());
        assert_eq!(log.clears(), vec![None]);
        assert_eq!(r.stats().full_renders, 2);
        Ok(())
    }

    #[test]
    fn adjacent_changes_merge() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        assert_eq!(
            r.render(scene(&[("a", RED), ("b", RED)]), SIZE, &mut backend)?,
            FrameOutcome::Partial(Rect::new(10, 10, 100, 40))
        );
        Ok(())
    }

    #[test]
    fn reorder_marks_every_moved_entry() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        assert_eq!(
            r.render(scene_ordered(&["b", "a", "c"], &[]), SIZE, &mut backend)?,
            FrameOutcome::Partial(Rect::new(10, 10, 100, 40))
        );
        Ok(())
    }

    #[test]
    fn offscreen_change_is_skipped() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        backend.reset();
        assert_eq!(
            r.render(scene(&[("ghost", RED)]), SIZE, &mut backend)?,
            FrameOutcome::Skipped
        );
        assert!(log.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn resize_invalidates_everything() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut r = Renderer::with_measurer(incremental(), FixedMeasurer::new(Expanse::new(5, 5)));
        r.render(scene(&[]), SIZE, &mut backend)?;
        r.render(scene(&[]), SIZE, &mut backend)?;
        assert_eq!(r.perf_stats().layout_cache.misses, 1);
        assert_eq!(r.perf_stats().spatial.inserts, 7);

        let bigger = Expanse::new(1024, 768);
        assert_eq!(r.render(scene(&[]), bigger, &mut backend)?, FrameOutcome::Full);
        assert_eq!(backend.invalidations, 1);
        assert_eq!(r.measurer().invalidations, 1);
        let stats = r.perf_stats();
        assert_eq!(stats.layout_cache.misses, 2);
        assert_eq!(stats.spatial.inserts, 14);
        assert_eq!(stats.spatial.total_items, 7);

        // Same size again: caches are reused.
        r.mark_dirty(None);
        assert_eq!(r.render(scene(&[]), bigger, &mut backend)?, FrameOutcome::Full);
        assert_eq!(backend.invalidations, 1);
        assert_eq!(r.perf_stats().layout_cache.hits, 1);
        Ok(())
    }

    #[test]
    fn manual_dirty_marks() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;

        let region = Rect::new(300, 300, 40, 40);
        r.mark_dirty(Some(region));
        assert_eq!(
            r.render(scene(&[]), SIZE, &mut backend)?,
            FrameOutcome::Partial(region)
        );
        // Queued regions are consumed by one frame.
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Skipped);

        r.mark_dirty(None);
        backend.reset();
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Full);
        assert_eq!(log.lock().unwrap().clears(), vec![None]);
        Ok(())
    }

    #[test]
    fn incremental_toggle() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Skipped);

        r.set_incremental(false);
        assert!(!r.incremental());
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Full);
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Full);

        r.set_incremental(true);
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Full);
        assert_eq!(r.render(scene(&[]), SIZE, &mut backend)?, FrameOutcome::Skipped);
        Ok(())
    }

    #[test]
    fn index_rebuilds_only_on_structure() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        assert_eq!(r.perf_stats().spatial.inserts, 7);

        r.render(scene(&[("b", RED)]), SIZE, &mut backend)?;
        assert_eq!(r.perf_stats().spatial.inserts, 7);

        let mut grown = scene(&[]);
        grown.push(DisplayNode::rect(Color::WHITE).at(400, 400).size(10, 10));
        r.render(grown, SIZE, &mut backend)?;
        assert_eq!(r.perf_stats().spatial.inserts, 15);
        assert!(r.spatial_index().contains("4"));
        Ok(())
    }

    #[test]
    fn stats_reset() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        r.render(scene(&[]), SIZE, &mut backend)?;
        r.render(scene(&[]), SIZE, &mut backend)?;
        let stats = r.perf_stats();
        assert_eq!(stats.render.full_renders, 1);
        assert_eq!(stats.render.skipped_frames, 1);
        assert_eq!(stats.cull.rendered, 6);
        assert_eq!(stats.cull.skipped, 1);
        assert_eq!(stats.hit_list_len, 6);

        r.reset_stats();
        let stats = r.perf_stats();
        assert_eq!(stats.render.full_renders, 0);
        assert_eq!(stats.cull.rendered, 0);
        assert_eq!(stats.spatial.inserts, 0);
        assert_eq!(stats.spatial.total_items, 7);
        Ok(())
    }

    #[test]
    fn keyed_edit_at_same_revision_repaints() -> Result<()> {
        let leaf = |c| vec![DisplayNode::rect(c).with_key("leaf").size(20, 20)];
        let (log, mut backend) = TestBackend::create();
        let mut r = Renderer::new(incremental());
        assert_eq!(r.render(leaf(Color::WHITE), SIZE, &mut backend)?, FrameOutcome::Full);
        backend.reset();
        assert_eq!(
            r.render(leaf(RED), SIZE, &mut backend)?,
            FrameOutcome::Partial(Rect::new(0, 0, 20, 20))
        );
        assert_eq!(log.lock().unwrap().painted_keys(), vec!["leaf"]);

        // The remembered hash now describes the red leaf.
        assert_eq!(r.render(leaf(RED), SIZE, &mut backend)?, FrameOutcome::Skipped);
        assert_eq!(
            r.render(leaf(Color::WHITE), SIZE, &mut backend)?,
            FrameOutcome::Partial(Rect::new(0, 0, 20, 20))
        );
        Ok(())
    }

    #[test]
    fn caches_stay_bounded_under_revision_churn() -> Result<()> {
        let ticker = |i: u64| {
            vec![
                DisplayNode::vstack(vec![
                    DisplayNode::text(format!("tick {i}"), 14)
                        .with_key("tick")
                        .with_revision(i),
                    DisplayNode::rect(Color::WHITE).with_key("row").size(100, 20),
                ])
                .with_key("list")
                .at(10, 10)
                .size(200, 300),
            ]
        };
        let (_, mut backend) = TestBackend::create();
        let measurer = CachingMeasurer::new(FixedMeasurer::new(Expanse::new(60, 14)));
        let mut r = Renderer::with_measurer(incremental(), measurer);
        for i in 0..200 {
            r.render(ticker(i), SIZE, &mut backend)?;
        }
        assert_eq!(r.stats().partial_renders, 199);
        assert!(r.hash_cache().len() <= 3);
        assert_eq!(r.layout_cache().len(), 1);
        assert!(r.measurer().len() <= 4);
        Ok(())
    }

    #[test]
    fn collaborator_errors_propagate() {
        let mut r = Renderer::new(RendererConfig::default());
        let mut failing = TestBackend::failing("device lost");
        assert_eq!(
            r.render(scene(&[]), SIZE, &mut failing),
            Err(Error::Paint("device lost".into()))
        );

        let measurer = |_: &DisplayNode, _: u32, _: u32| -> Result<Expanse> {
            Err(Error::Measure("no font".into()))
        };
        let mut r = Renderer::with_measurer(RendererConfig::default(), measurer);
        let (_, mut backend) = TestBackend::create();
        let nodes = vec![DisplayNode::text("hello", 12)];
        assert_eq!(
            r.render(nodes, SIZE, &mut backend),
            Err(Error::Measure("no font".into()))
        );
    }
}
