use egui::{pos2, Color32};
use futures::executor::block_on;
use sketch_studio::pipeline::{run_enhancement, run_story, EnhancementResult};
use sketch_studio::{
    ArtStyle, DrawingSession, PointerEvent, ServiceError, Services, SessionError, SessionResult,
    StudioConfig, SurfaceKind, ToolMode,
};

fn create_session() -> DrawingSession {
    DrawingSession::new(StudioConfig {
        sketch_size: [20, 20],
        art_size: [60, 80],
        ..StudioConfig::default()
    })
    .unwrap()
}

fn services(session: &DrawingSession) -> Services {
    Services::placeholder(session.config().art_size)
}

// Draws a diagonal line on the sketch surface
fn scribble(session: &mut DrawingSession) {
    session.pointer_down(SurfaceKind::Sketch, pos2(2.0, 2.0));
    session.pointer_move(SurfaceKind::Sketch, pos2(15.0, 15.0));
    session.pointer_up(SurfaceKind::Sketch);
}

// Runs a full enhancement against the placeholder services
fn enhance(session: &mut DrawingSession) -> SessionResult<usize> {
    let request = session.begin_enhancement()?;
    let result = block_on(run_enhancement(services(session), request));
    session.complete_enhancement(result)
}

#[test]
fn test_enhancement_adds_selected_history_entry() {
    let mut session = create_session();
    scribble(&mut session);
    session.set_style(ArtStyle::Nature);

    let index = enhance(&mut session).unwrap();

    assert_eq!(index, 0);
    assert!(session.state().is_idle());
    assert_eq!(session.history().selected(), Some(0));
    let entry = session.history().get(0).unwrap();
    assert_eq!(entry.style(), ArtStyle::Nature);
    assert_eq!(entry.prompt(), Some("A child's drawing of a few simple lines"));
    assert_eq!(session.displayed_entry(), Some(entry.id()));

    let art = session.art().unwrap();
    assert_eq!(art.size(), [60, 80]);
    assert_eq!(art.pixel(30, 40), ArtStyle::Nature.accent());
}

#[test]
fn test_blank_sketch_is_not_enhanced() {
    let mut session = create_session();
    assert!(matches!(session.begin_enhancement(), Err(SessionError::NoSketch)));
    assert!(session.state().is_idle());
}

#[test]
fn test_second_enhancement_while_generating_is_busy() {
    let mut session = create_session();
    scribble(&mut session);
    session.begin_enhancement().unwrap();

    assert!(matches!(
        session.begin_enhancement(),
        Err(SessionError::Busy { .. })
    ));
}

#[test]
fn test_result_after_clear_all_is_discarded() {
    let mut session = create_session();
    scribble(&mut session);
    let request = session.begin_enhancement().unwrap();
    let result = block_on(run_enhancement(services(&session), request));

    session.clear_all();

    assert!(matches!(
        session.complete_enhancement(result),
        Err(SessionError::StaleGeneration)
    ));
    assert!(session.history().is_empty());
    assert!(session.art().is_none());
    assert!(session.sketch().is_uniform());
}

#[test]
fn test_only_newest_generation_is_applied() {
    let mut session = create_session();
    scribble(&mut session);
    let old_request = session.begin_enhancement().unwrap();
    session.cancel_generation();
    let new_request = session.begin_enhancement().unwrap();
    assert!(new_request.token > old_request.token);

    let old_result = block_on(run_enhancement(services(&session), old_request));
    let new_result = block_on(run_enhancement(services(&session), new_request));

    assert!(matches!(
        session.complete_enhancement(old_result),
        Err(SessionError::StaleGeneration)
    ));
    assert_eq!(session.complete_enhancement(new_result).unwrap(), 0);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_failed_enhancement_reports_error() {
    let mut session = create_session();
    scribble(&mut session);
    let request = session.begin_enhancement().unwrap();

    let result = session.complete_enhancement(EnhancementResult {
        token: request.token,
        outcome: Err(ServiceError::Failed("quota exceeded".into())),
    });

    assert!(matches!(result, Err(SessionError::Service(_))));
    assert!(session.state().is_idle());
    assert!(session.history().is_empty());
    assert!(session.last_error().is_some());

    session.dismiss_error();
    assert!(session.last_error().is_none());
}

#[test]
fn test_drawing_is_ignored_while_generating() {
    let mut session = create_session();
    scribble(&mut session);
    session.begin_enhancement().unwrap();
    let revision = session.sketch().revision();

    assert!(!session.pointer_down(SurfaceKind::Sketch, pos2(5.0, 5.0)));
    assert_eq!(session.sketch().revision(), revision);
}

#[test]
fn test_sparse_pointer_samples_leave_no_gaps() {
    let mut session = create_session();
    session.set_brush_width(2.0);

    session.handle_pointer(SurfaceKind::Sketch, PointerEvent::Down(pos2(0.0, 10.0)));
    session.handle_pointer(SurfaceKind::Sketch, PointerEvent::Move(pos2(19.0, 10.0)));
    session.handle_pointer(SurfaceKind::Sketch, PointerEvent::Up);

    for x in 0..20 {
        assert_eq!(session.sketch().pixel(x, 10), Color32::BLACK, "gap at x = {x}");
    }
}

#[test]
fn test_fill_mode_fills_art_but_not_sketch() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();
    session.set_color(Color32::RED);
    assert_eq!(session.tool_mode(), ToolMode::Fill);

    assert!(session.pointer_down(SurfaceKind::Art, pos2(0.0, 0.0)));
    assert!(!session.state().is_drawing());
    assert_eq!(session.art().unwrap().pixel(0, 0), Color32::RED);

    // The sketch surface draws with the pen even in fill mode
    session.pointer_down(SurfaceKind::Sketch, pos2(18.0, 1.0));
    assert!(session.state().is_drawing());
    session.pointer_up(SurfaceKind::Sketch);
    assert_eq!(session.sketch().pixel(18, 1), Color32::RED);
    assert_eq!(session.sketch().pixel(0, 19), Color32::WHITE);
}

#[test]
fn test_pen_mode_strokes_on_art() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();
    assert_eq!(session.toggle_tool_mode(), ToolMode::Pen);

    session.pointer_down(SurfaceKind::Art, pos2(10.0, 10.0));
    session.pointer_move(SurfaceKind::Art, pos2(20.0, 10.0));
    let stroke = session.pointer_up(SurfaceKind::Art).unwrap();

    assert_eq!(stroke.points(), &[pos2(10.0, 10.0), pos2(20.0, 10.0)]);
    assert_eq!(session.art().unwrap().pixel(15, 10), session.color());
}

#[test]
fn test_selecting_history_restores_saved_coloring() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();
    enhance(&mut session).unwrap();

    session.set_color(Color32::RED);
    session.pointer_down(SurfaceKind::Art, pos2(0.0, 0.0));
    assert_eq!(session.save_coloring().unwrap(), 1);

    session.select_history(0).unwrap();
    assert_eq!(session.art().unwrap().pixel(0, 0), Color32::WHITE);

    session.select_history(1).unwrap();
    assert_eq!(session.art().unwrap().pixel(0, 0), Color32::RED);
    assert_eq!(session.history().selected(), Some(1));
}

#[test]
fn test_deleting_displayed_entry_clears_art() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();
    enhance(&mut session).unwrap();

    session.delete_history(0).unwrap();
    assert!(session.art().is_some());
    assert_eq!(session.history().selected(), Some(0));

    session.delete_history(0).unwrap();
    assert!(session.art().is_none());
    assert_eq!(session.displayed_entry(), None);
    assert_eq!(session.history().selected(), None);
}

#[test]
fn test_story_is_attached_to_its_entry() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();

    let request = session.begin_story(0).unwrap();
    assert!(session.state().is_generating());
    let result = block_on(run_story(services(&session), request));

    assert_eq!(session.complete_story(result).unwrap(), 0);
    let story = session.history().get(0).and_then(|e| e.story()).unwrap();
    assert!(story.starts_with("Once upon a time"));
}

#[test]
fn test_story_for_deleted_entry_is_discarded() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();

    let request = session.begin_story(0).unwrap();
    let result = block_on(run_story(services(&session), request));
    session.delete_history(0).unwrap();

    assert!(matches!(
        session.complete_story(result),
        Err(SessionError::StaleGeneration)
    ));
    assert!(session.state().is_idle());
}

#[test]
fn test_clear_all_keeps_history_but_deselects() {
    let mut session = create_session();
    scribble(&mut session);
    enhance(&mut session).unwrap();

    session.clear_all();

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().selected(), None);
    assert!(session.art().is_none());
    assert!(matches!(
        session.save_coloring(),
        Err(SessionError::NoSelection)
    ));
}
