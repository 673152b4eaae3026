#![forbid(unsafe_code)]

//! End-to-end tests for the compiler / output pane / editor protocol.
//!
//! Every scenario runs a real session bus with a [`CompilerPublisher`], one
//! or more [`OutputPane`]s mounted in [`MemoryContainer`]s, and an editor
//! stand-in that records decoration requests.
//!
//! Run:
//!   cargo test -p outpane-pane --test e2e_pane_protocol

use std::cell::RefCell;
use std::rc::Rc;

use outpane_hub::HubHandle;
use outpane_pane::{
    CompilerId, CompilerMeta, CompilerPublisher, EditorId, EventKind, ExecResult, LinkResponse,
    MemoryContainer, OutputLine, OutputPane, PaneConfig, PaneEvent, PaneLifecycle,
    PaneViewState, RenderedLine, ResultModel, Session,
};

// ============================================================================
// Fixtures
// ============================================================================

struct EditorStub {
    _handle: HubHandle<PaneEvent>,
    decorations: Rc<RefCell<Vec<(EditorId, u32, bool)>>>,
}

impl EditorStub {
    fn attach(session: &Session) -> Self {
        let handle = session.handle();
        let decorations = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&decorations);
        handle.subscribe(EventKind::EditorSetDecoration, move |event| {
            if let PaneEvent::EditorSetDecoration {
                editor,
                line,
                reveal,
            } = event
            {
                sink.borrow_mut().push((*editor, *line, *reveal));
            }
        });
        Self {
            _handle: handle,
            decorations,
        }
    }

    fn decorations(&self) -> Vec<(EditorId, u32, bool)> {
        self.decorations.borrow().clone()
    }
}

fn open_pane(session: &Session, compiler: u32, editor: u32) -> (OutputPane, Rc<MemoryContainer>) {
    let container = Rc::new(MemoryContainer::new());
    let pane = OutputPane::new(
        session,
        container.clone(),
        PaneViewState::new(CompilerId(compiler), EditorId(editor)),
        PaneConfig::default(),
    );
    (pane, container)
}

fn kinds(content: &outpane_pane::RenderedContent) -> Vec<&'static str> {
    content
        .lines()
        .iter()
        .map(|line| match line {
            RenderedLine::Compiler { .. } => "compiler",
            RenderedLine::Summary(_) => "summary",
            RenderedLine::Program { .. } => "program",
        })
        .collect()
}

// ============================================================================
// Scenario from the protocol description
// ============================================================================

#[test]
fn error_line_links_to_editor() {
    let session = Session::new();
    let editor = EditorStub::attach(&session);
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 7);

    let result =
        ResultModel::from_json_str(r#"{"code":1,"stderr":[{"text":"error: x","line":3}]}"#)
            .unwrap();
    compiler.publish(None, result);

    let content = pane.content();
    assert_eq!(
        content.lines(),
        &[
            RenderedLine::Compiler {
                markup: "error: x".into(),
                source_line: Some(3),
            },
            RenderedLine::Summary("Compiler returned: 1".into()),
        ]
    );

    assert_eq!(pane.activate_line(0), LinkResponse::Handled);
    assert_eq!(editor.decorations(), vec![(EditorId(7), 3, true)]);
}

#[test]
fn hover_highlights_without_reveal() {
    let session = Session::new();
    let editor = EditorStub::attach(&session);
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 2);

    compiler.publish(
        None,
        ResultModel {
            stdout: vec![OutputLine::tagged("note", 10), OutputLine::plain("plain")],
            ..ResultModel::default()
        },
    );

    assert_eq!(pane.hover_line(0), LinkResponse::Handled);
    assert_eq!(pane.hover_line(1), LinkResponse::Ignored);
    assert_eq!(pane.activate_line(2), LinkResponse::Ignored);
    assert_eq!(pane.activate_line(99), LinkResponse::Ignored);
    assert_eq!(editor.decorations(), vec![(EditorId(2), 10, false)]);
}

// ============================================================================
// Identity filtering
// ============================================================================

#[test]
fn foreign_results_are_ignored() {
    let session = Session::new();
    let other = CompilerPublisher::new(&session, CompilerId(2));
    let (pane, container) = open_pane(&session, 1, 1);
    let titles_before = container.titles();

    other.publish(Some(CompilerMeta::named("clang")), ResultModel::with_code(5));

    assert!(pane.content().is_empty());
    assert_eq!(pane.title(), "#1");
    assert_eq!(container.titles(), titles_before);
}

#[test]
fn foreign_close_is_ignored() {
    let session = Session::new();
    let other = CompilerPublisher::new(&session, CompilerId(2));
    let (pane, container) = open_pane(&session, 1, 1);

    other.close();
    session.run_pending();

    assert_eq!(pane.lifecycle(), PaneLifecycle::Active);
    assert!(!container.is_closed());
}

// ============================================================================
// Defaulting and child output gating
// ============================================================================

#[test]
fn bare_code_renders_single_summary() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 1);

    compiler.publish(None, ResultModel::from_json_str(r#"{"code":0}"#).unwrap());
    assert_eq!(pane.content().plain_text(), "Compiler returned: 0");
}

#[test]
fn silent_program_only_reports_exit_code() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 1);

    compiler.publish(
        None,
        ResultModel {
            exec_result: Some(ExecResult {
                code: 42,
                ..ExecResult::default()
            }),
            ..ResultModel::default()
        },
    );
    assert_eq!(
        pane.content().plain_text(),
        "Compiler returned: 0\nProgram returned: 42"
    );
}

#[test]
fn program_output_follows_summaries() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 1);

    compiler.publish(
        None,
        ResultModel {
            stdout: vec![OutputLine::plain("warn")],
            exec_result: Some(ExecResult {
                code: 0,
                stdout: vec![OutputLine::plain("hello"), OutputLine::plain("world")],
                stderr: vec![OutputLine::plain("oops")],
            }),
            ..ResultModel::default()
        },
    );

    let content = pane.content();
    assert_eq!(
        kinds(&content),
        vec!["compiler", "summary", "summary", "program", "program", "program"]
    );
    assert_eq!(
        content.plain_text(),
        "warn\nCompiler returned: 0\nProgram returned: 0\noops\nhello\nworld"
    );
}

#[test]
fn new_result_replaces_old_content() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 1);

    compiler.publish(
        None,
        ResultModel {
            stderr: vec![OutputLine::plain("a"), OutputLine::plain("b")],
            ..ResultModel::with_code(1)
        },
    );
    compiler.publish(None, ResultModel::with_code(0));
    assert_eq!(pane.content().len(), 1);
}

// ============================================================================
// Titles
// ============================================================================

#[test]
fn name_persists_across_results_without_meta() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(3));
    let (pane, container) = open_pane(&session, 3, 1);
    assert_eq!(container.title().as_deref(), Some("#3"));

    compiler.publish(Some(CompilerMeta::named("gcc 12")), ResultModel::with_code(0));
    assert_eq!(container.title().as_deref(), Some("#3 with gcc 12"));

    compiler.publish(None, ResultModel::with_code(1));
    assert_eq!(pane.title(), "#3 with gcc 12");
    assert_eq!(pane.compiler_name().as_deref(), Some("gcc 12"));
}

#[test]
fn result_name_is_used_without_meta() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 1);

    compiler.publish(
        None,
        ResultModel {
            compiler_name: Some("rustc 1.80".into()),
            ..ResultModel::default()
        },
    );
    assert_eq!(pane.title(), "#1 with rustc 1.80");

    compiler.publish(Some(CompilerMeta::named("rustc 1.81")), ResultModel::default());
    assert_eq!(pane.title(), "#1 with rustc 1.81");
}

// ============================================================================
// Late panes and multiple panes
// ============================================================================

#[test]
fn late_pane_receives_replay() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    compiler.publish(Some(CompilerMeta::named("gcc")), ResultModel::with_code(2));

    let (pane, container) = open_pane(&session, 1, 1);
    assert_eq!(pane.content().plain_text(), "Compiler returned: 2");
    assert_eq!(container.title().as_deref(), Some("#1 with gcc"));
    assert_eq!(pane.lifecycle(), PaneLifecycle::Active);
    assert_eq!(compiler.outputs(), 1);
}

#[test]
fn two_panes_for_one_compiler() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (a, _ca) = open_pane(&session, 1, 1);
    let (b, _cb) = open_pane(&session, 1, 2);
    assert_eq!(compiler.outputs(), 2);

    compiler.publish(None, ResultModel::with_code(9));
    assert_eq!(a.content(), b.content());

    b.on_destroy();
    assert_eq!(compiler.outputs(), 1);
    compiler.publish(None, ResultModel::with_code(3));
    assert_eq!(a.content().plain_text(), "Compiler returned: 3");
    assert_eq!(b.content().plain_text(), "Compiler returned: 9");
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn compiler_close_tears_down_in_two_phases() {
    let session = Session::new();
    let editor = EditorStub::attach(&session);
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, container) = open_pane(&session, 1, 1);
    let closed_seen = Rc::new(RefCell::new(Vec::new()));
    let observer = session.handle();
    let sink = Rc::clone(&closed_seen);
    observer.subscribe(EventKind::OutputClosed, move |event| {
        sink.borrow_mut().push(event.compiler());
    });

    compiler.close();

    assert!(pane.is_closed());
    assert_eq!(*closed_seen.borrow(), vec![Some(CompilerId(1))]);
    assert!(!container.is_closed());
    assert_eq!(session.ticks().pending(), 1);

    assert_eq!(session.run_pending(), 1);
    assert_eq!(container.close_calls(), 1);

    // Nothing reaches a closed pane.
    session.emit(PaneEvent::CompileResult {
        compiler: CompilerId(1),
        meta: None,
        result: Rc::new(ResultModel::with_code(1)),
    });
    assert!(pane.content().is_empty());
    assert_eq!(pane.activate_line(0), LinkResponse::Ignored);
    assert!(editor.decorations().is_empty());
}

#[test]
fn closed_pane_stops_persisting_options() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, container) = open_pane(&session, 1, 1);
    let persisted = container.states().len();

    compiler.close();
    pane.set_wrap(true);
    pane.set_font_scale(20.0);

    assert_eq!(container.states().len(), persisted);
    assert_eq!(session.hub().subscriber_count(EventKind::CompileResult), 0);
    assert_eq!(session.hub().subscriber_count(EventKind::CompilerClose), 0);
}

#[test]
fn reopened_state_round_trips() {
    let session = Session::new();
    let (pane, container) = open_pane(&session, 6, 4);
    pane.set_wrap(true);
    pane.set_font_scale(18.0);
    let saved = container.state().unwrap();
    pane.on_destroy();

    let restored = PaneViewState::from_json_str(&saved.to_json_string().unwrap()).unwrap();
    let container = Rc::new(MemoryContainer::new());
    let pane = OutputPane::new(&session, container, restored, PaneConfig::default());
    assert_eq!(pane.view_state(), saved);
    assert_eq!(pane.wrap_label(), "[ON] Wrap lines");
}

#[test]
fn close_reentered_from_output_closed_is_a_no_op() {
    let session = Session::new();
    let compiler = Rc::new(CompilerPublisher::new(&session, CompilerId(1)));
    let (pane, container) = open_pane(&session, 1, 1);

    // A coupled view tears the compiler down as soon as its output goes away.
    let announced = Rc::new(RefCell::new(0usize));
    let observer = session.handle();
    let sink = Rc::clone(&announced);
    let coupled = Rc::clone(&compiler);
    observer.subscribe(EventKind::OutputClosed, move |_| {
        *sink.borrow_mut() += 1;
        coupled.close();
    });

    pane.on_destroy();
    session.run_pending();

    assert!(pane.is_closed());
    assert!(compiler.is_closed());
    assert_eq!(*announced.borrow(), 1);
    assert_eq!(container.close_calls(), 0);
    assert_eq!(session.ticks().pending(), 0);
}

#[test]
fn empty_meta_name_falls_back_to_result_name() {
    let session = Session::new();
    let compiler = CompilerPublisher::new(&session, CompilerId(1));
    let (pane, _container) = open_pane(&session, 1, 1);

    compiler.publish(
        Some(CompilerMeta::named("")),
        ResultModel {
            compiler_name: Some("clang 17".into()),
            ..ResultModel::default()
        },
    );
    assert_eq!(pane.title(), "#1 with clang 17");
}
