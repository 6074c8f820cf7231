use crate::api::{ApiError, ApiErrorKind, BlockUpdate};
use crate::grid::{
    candidate_size, is_valid_placement, renderable_blocks, snap_size, CENTER_BLOCK_ID,
};
use crate::models::{Block, BlockKind, BlockStyle, Position};
use crate::state::AppContext;
use crate::util::new_block_id;
use leptos::logging;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

/// Quiet period before an intermediate resize size is written remotely.
const RESIZE_DEBOUNCE_MS: i32 = 100;

/// Background reconciliation cadence.
const RECONCILE_INTERVAL_MS: i32 = 5000;

/// Single backoff before retrying an idempotent call that hit a
/// transport failure.
const RETRY_BACKOFF_MS: i32 = 500;

/// Transient resize-drag state. Created on handle mouse-down, cleared
/// unconditionally on mouse-up. `pre_session_blocks` is the rollback
/// snapshot for the (single, debounced) remote write the session emits.
#[derive(Clone)]
pub(crate) struct ResizeSession {
    pub anchor_block_id: String,
    pub pointer_start: (f64, f64),
    pub start_size: (i32, i32),
    pub current_preview_size: (i32, i32),
    pre_session_blocks: Vec<Block>,
}

/// Optimistic mutation + remote persistence + reconciliation for one
/// user's block grid.
///
/// Responsibilities:
/// - local-first mutations (add/move/resize/delete/edit), rolled back
///   when the remote write fails
/// - debounced resize persistence (one write per quiet period,
///   superseded writes cancelled rather than queued)
/// - background reconciliation toward the remote snapshot while no
///   interactive session is running
///
/// Non-responsibilities:
/// - grid geometry (pure functions in `crate::grid`)
/// - pointer handling (the editor component feeds this controller)
#[derive(Clone)]
pub(crate) struct BlockSyncController {
    app_state: AppContext,

    /// Username owning the page. Writes are refused for anyone else.
    owner: StoredValue<String>,

    /// Persisted working copy. What is *shown* is derived via
    /// `renderable_blocks`; see `shown_blocks`.
    pub blocks: RwSignal<Vec<Block>>,

    /// Last list received from the store.
    remote_snapshot: RwSignal<Vec<Block>>,

    pub loading: RwSignal<bool>,

    /// Non-blocking failure notice for the page chrome.
    pub notice: RwSignal<Option<String>>,

    /// True between dragstart and drop/dragend. Blocks reconciliation
    /// from clobbering an in-progress drag.
    pub drag_in_progress: RwSignal<bool>,

    resize_session: StoredValue<Option<ResizeSession>>,
    resize_timer: StoredValue<Option<i32>>,
    reconcile_timer: StoredValue<Option<i32>>,
}

impl BlockSyncController {
    pub fn new(app_state: AppContext, owner: String) -> Self {
        let s = Self {
            app_state,
            owner: StoredValue::new(owner),
            blocks: RwSignal::new(vec![]),
            remote_snapshot: RwSignal::new(vec![]),
            loading: RwSignal::new(false),
            notice: RwSignal::new(None),
            drag_in_progress: RwSignal::new(false),
            resize_session: StoredValue::new(None),
            resize_timer: StoredValue::new(None),
            reconcile_timer: StoredValue::new(None),
        };

        s.start_reconcile_worker();
        s
    }

    /// The rendered list: persisted blocks plus the synthesized center
    /// when none is stored. Never fed back into the store.
    pub fn shown_blocks(&self) -> Vec<Block> {
        renderable_blocks(&self.blocks.get())
    }

    fn shown_untracked(&self) -> Vec<Block> {
        renderable_blocks(&self.blocks.get_untracked())
    }

    /// A pending debounced write counts as resize activity: it still
    /// carries the size the user last saw, and reconciliation must not
    /// overwrite that size with a stale remote one before it lands.
    fn resize_in_progress(&self) -> bool {
        self.resize_session.with_value(|s| s.is_some()) || self.resize_timer.get_value().is_some()
    }

    /// Every write is scoped to the acting identity; a mismatch with the
    /// page owner is refused locally, before any mutation or call.
    fn authorize(&self, acting: &str) -> Result<(), ApiError> {
        if acting == self.owner.get_value() {
            Ok(())
        } else {
            logging::warn!("refusing write: {} does not own this page", acting);
            Err(ApiError::unauthorized())
        }
    }

    fn report_failure(&self, ctx: &str, e: &ApiError) {
        logging::warn!("{ctx}: {e}");
        self.notice.set(Some(format!("{ctx}: {e}")));
    }

    /// Initial load of the owner's persisted blocks.
    pub fn load(&self) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let owner = self.owner.get_value();
        let s2 = self.clone();

        self.loading.set(true);
        spawn_local(async move {
            match api_client.list_blocks(&owner).await {
                Ok(list) => {
                    s2.remote_snapshot.set(list.clone());
                    s2.blocks.set(list);
                }
                Err(e) => s2.report_failure("Failed to load page", &e),
            }
            s2.loading.set(false);
        });
    }

    /* ------------------------------ add ------------------------------ */

    /// Add a 1x1 text block at an empty cell. Occupied or out-of-bounds
    /// targets are a silent no-op (invalid placement never reaches the
    /// store). On success the server's canonical list replaces local
    /// state; on failure the pre-mutation snapshot is restored.
    pub fn add_block(&self, acting: &str, x: i32, y: i32) {
        if self.authorize(acting).is_err() {
            return;
        }

        let shown = self.shown_untracked();
        if !is_valid_placement(x, y, 1, 1, None, &shown) {
            return;
        }

        let new_block = Block {
            id: new_block_id(),
            kind: BlockKind::Text,
            content: "New block".to_string(),
            position: Position { x, y, w: 1, h: 1 },
            is_center: false,
            style: BlockStyle {
                background_color: Some("rgb(23, 23, 23)".to_string()),
                text_color: Some("white".to_string()),
            },
        };

        let snapshot = self.blocks.get_untracked();
        self.blocks.update(|xs| xs.push(new_block.clone()));

        let api_client = self.app_state.0.api_client.get_untracked();
        let acting = acting.to_string();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.create_block(&acting, &new_block).await {
                Ok(canonical) => {
                    s2.remote_snapshot.set(canonical.clone());
                    s2.blocks.set(canonical);
                }
                Err(e) => {
                    s2.blocks.set(snapshot);
                    s2.report_failure("Failed to add block", &e);
                }
            }
        });
    }

    /* ----------------------------- move ------------------------------ */

    pub fn begin_drag(&self) {
        self.drag_in_progress.set(true);
    }

    pub fn end_drag(&self) {
        self.drag_in_progress.set(false);
    }

    /// Drop a dragged block onto cell `(x, y)`, size preserved. An
    /// invalid target (bounds or collision) leaves local state untouched
    /// and issues no call. A valid one applies optimistically and writes
    /// immediately (not debounced).
    pub fn drop_block(&self, acting: &str, id: &str, x: i32, y: i32) {
        self.drag_in_progress.set(false);

        if self.authorize(acting).is_err() {
            return;
        }

        let shown = self.shown_untracked();
        let Some(dragged) = shown.iter().find(|b| b.id == id) else {
            return;
        };
        if dragged.is_center {
            return;
        }

        let (w, h) = (dragged.position.w, dragged.position.h);
        if !is_valid_placement(x, y, w, h, Some(id), &shown) {
            return;
        }

        let snapshot = self.blocks.get_untracked();
        self.blocks.update(|xs| {
            if let Some(b) = xs.iter_mut().find(|b| b.id == id) {
                b.position.x = x;
                b.position.y = y;
            }
        });

        self.send_position_update(
            acting.to_string(),
            id.to_string(),
            BlockUpdate::moved_to(x, y),
            snapshot,
            false,
        );
    }

    /// Issue a position write. Position updates are idempotent, so a
    /// transport failure earns exactly one scheduled retry; any other
    /// failure rolls local state back to `snapshot`.
    fn send_position_update(
        &self,
        acting: String,
        id: String,
        updates: BlockUpdate,
        snapshot: Vec<Block>,
        retried: bool,
    ) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.update_block(&acting, &id, &updates).await {
                Ok(()) => {
                    // The remote snapshot only advances on an ack.
                    s2.remote_snapshot.update(|xs| {
                        if let Some(b) = xs.iter_mut().find(|b| b.id == id) {
                            apply_update(b, &updates);
                        }
                    });
                }
                Err(e) => match update_failure_action(&e.kind, retried) {
                    FailureAction::Retry => {
                        let s3 = s2.clone();
                        schedule_timeout(RETRY_BACKOFF_MS, move || {
                            s3.send_position_update(acting, id, updates, snapshot, true);
                        });
                    }
                    _ => {
                        s2.blocks.set(snapshot);
                        s2.report_failure("Failed to move block", &e);
                    }
                },
            }
        });
    }

    /* ---------------------------- resize ----------------------------- */

    pub fn resize_start(&self, id: &str, client_x: f64, client_y: f64) {
        let shown = self.shown_untracked();
        let Some(b) = shown.iter().find(|b| b.id == id) else {
            return;
        };
        // Center blocks are fixed-size.
        if b.is_center {
            return;
        }

        self.resize_session.set_value(Some(ResizeSession {
            anchor_block_id: id.to_string(),
            pointer_start: (client_x, client_y),
            start_size: (b.position.w, b.position.h),
            current_preview_size: (b.position.w, b.position.h),
            pre_session_blocks: self.blocks.get_untracked(),
        }));
    }

    /// Map pointer movement onto a snapped size and apply it to the
    /// preview when valid. Each applied change re-arms the debounced
    /// remote write, cancelling the previously scheduled one.
    pub fn resize_move(&self, acting: &str, client_x: f64, client_y: f64) {
        let Some(mut session) = self.resize_session.get_value() else {
            return;
        };
        if self.authorize(acting).is_err() {
            return;
        }

        let shown = self.shown_untracked();
        let Some((w, h)) = preview_size(&session, &shown, client_x, client_y) else {
            return;
        };
        let id = session.anchor_block_id.clone();

        self.blocks.update(|xs| {
            if let Some(x) = xs.iter_mut().find(|x| x.id == id) {
                x.position.w = w;
                x.position.h = h;
            }
        });

        session.current_preview_size = (w, h);
        let rollback = session.pre_session_blocks.clone();
        self.resize_session.set_value(Some(session));

        self.schedule_resize_write(acting.to_string(), id, w, h, rollback);
    }

    /// Cleared unconditionally on pointer-up, whether or not a valid
    /// size was ever reached. A pending debounced write (which carries
    /// the final size) is left to fire.
    pub fn resize_end(&self) {
        self.resize_session.set_value(None);
    }

    fn schedule_resize_write(
        &self,
        acting: String,
        id: String,
        w: i32,
        h: i32,
        rollback: Vec<Block>,
    ) {
        let Some(win) = web_sys::window() else {
            return;
        };

        // Superseded pending writes are cancelled, never queued.
        if let Some(tid) = self.resize_timer.get_value() {
            win.clear_timeout_with_handle(tid);
        }

        let s2 = self.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            s2.resize_timer.set_value(None);
            s2.flush_resize_write(acting, id, w, h, rollback, false);
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                RESIZE_DEBOUNCE_MS,
            )
            .unwrap_or(0);
        self.resize_timer.set_value(Some(tid));
    }

    fn flush_resize_write(
        &self,
        acting: String,
        id: String,
        w: i32,
        h: i32,
        rollback: Vec<Block>,
        retried: bool,
    ) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let updates = BlockUpdate::resized_to(w, h);
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.update_block(&acting, &id, &updates).await {
                Ok(()) => {
                    s2.remote_snapshot.update(|xs| {
                        if let Some(b) = xs.iter_mut().find(|b| b.id == id) {
                            b.position.w = w;
                            b.position.h = h;
                        }
                    });
                }
                Err(e) => match update_failure_action(&e.kind, retried) {
                    FailureAction::Retry => {
                        let s3 = s2.clone();
                        schedule_timeout(RETRY_BACKOFF_MS, move || {
                            s3.flush_resize_write(acting, id, w, h, rollback, true);
                        });
                    }
                    _ => {
                        s2.blocks.set(rollback);
                        s2.report_failure("Failed to resize block", &e);
                    }
                },
            }
        });
    }

    /* ---------------------------- delete ----------------------------- */

    /// Delete a block. The center block is exempt. A remote `NotFound`
    /// keeps the local removal (the block was already gone; the delete
    /// is idempotent against the id); other failures roll back.
    pub fn delete_block(&self, acting: &str, id: &str) {
        if self.authorize(acting).is_err() {
            return;
        }

        let shown = self.shown_untracked();
        let Some(target) = shown.iter().find(|b| b.id == id) else {
            return;
        };
        if target.is_center {
            return;
        }

        let snapshot = self.blocks.get_untracked();
        self.blocks.update(|xs| xs.retain(|b| b.id != id));

        self.send_delete(acting.to_string(), id.to_string(), snapshot, false);
    }

    fn send_delete(&self, acting: String, id: String, snapshot: Vec<Block>, retried: bool) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.delete_block(&acting, &id).await {
                Ok(()) => {
                    s2.remote_snapshot.update(|xs| xs.retain(|b| b.id != id));
                }
                Err(e) => match delete_failure_action(&e.kind, retried) {
                    FailureAction::KeepLocal => {
                        // Already absent remotely; local removal stands.
                        logging::log!("delete {id}: already gone remotely");
                        s2.remote_snapshot.update(|xs| xs.retain(|b| b.id != id));
                    }
                    FailureAction::Retry => {
                        let s3 = s2.clone();
                        schedule_timeout(RETRY_BACKOFF_MS, move || {
                            s3.send_delete(acting, id, snapshot, true);
                        });
                    }
                    FailureAction::Rollback => {
                        s2.blocks.set(snapshot);
                        s2.report_failure("Failed to delete block", &e);
                    }
                },
            }
        });
    }

    /* ------------------------- content edits ------------------------- */

    pub fn update_content(&self, acting: &str, id: &str, content: String) {
        self.edit_block(acting, id, BlockUpdate {
            content: Some(content),
            ..Default::default()
        });
    }

    /// Change a block's kind. Center blocks keep their kind for life.
    pub fn update_kind(&self, acting: &str, id: &str, kind: BlockKind) {
        if self
            .shown_untracked()
            .iter()
            .any(|b| b.id == id && b.is_center)
        {
            return;
        }
        self.edit_block(acting, id, BlockUpdate {
            kind: Some(kind),
            ..Default::default()
        });
    }

    pub fn update_style(&self, acting: &str, id: &str, style: BlockStyle) {
        self.edit_block(acting, id, BlockUpdate {
            style: Some(style),
            ..Default::default()
        });
    }

    /// Shared optimistic path for content/kind/style edits: apply,
    /// write, restore the pre-mutation snapshot on failure. No retry;
    /// these are not in the idempotent set.
    fn edit_block(&self, acting: &str, id: &str, updates: BlockUpdate) {
        if self.authorize(acting).is_err() {
            return;
        }
        // The synthesized center only exists client-side; there is
        // nothing to edit at the store.
        if id == CENTER_BLOCK_ID {
            return;
        }
        if !self.blocks.get_untracked().iter().any(|b| b.id == id) {
            return;
        }

        let snapshot = self.blocks.get_untracked();
        self.blocks.update(|xs| {
            if let Some(b) = xs.iter_mut().find(|b| b.id == id) {
                apply_update(b, &updates);
            }
        });

        let api_client = self.app_state.0.api_client.get_untracked();
        let acting = acting.to_string();
        let id = id.to_string();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.update_block(&acting, &id, &updates).await {
                Ok(()) => {
                    s2.remote_snapshot.update(|xs| {
                        if let Some(b) = xs.iter_mut().find(|b| b.id == id) {
                            apply_update(b, &updates);
                        }
                    });
                }
                Err(e) => {
                    s2.blocks.set(snapshot);
                    s2.report_failure("Failed to update block", &e);
                }
            }
        });
    }

    /* ------------------------- reconciliation ------------------------ */

    fn start_reconcile_worker(&self) {
        if self.reconcile_timer.get_value().is_some() {
            return;
        }
        let Some(win) = web_sys::window() else {
            return;
        };

        let s2 = self.clone();
        let cb = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
            s2.reconcile_tick();
        }) as Box<dyn FnMut()>);

        let tid = win
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                RECONCILE_INTERVAL_MS,
            )
            .unwrap_or(0);
        self.reconcile_timer.set_value(Some(tid));

        cb.forget();
    }

    /// Refresh the remote snapshot and converge local state toward it,
    /// unless an interactive drag or resize is running (a stale refresh
    /// must not clobber an in-progress gesture).
    fn reconcile_tick(&self) {
        if self.drag_in_progress.get_untracked() || self.resize_in_progress() {
            return;
        }

        let api_client = self.app_state.0.api_client.get_untracked();
        let owner = self.owner.get_value();
        let s2 = self.clone();
        spawn_local(async move {
            let Ok(list) = api_client.list_blocks(&owner).await else {
                // Transient read failure; the next tick will probe again.
                return;
            };
            s2.remote_snapshot.set(list.clone());

            if s2.drag_in_progress.get_untracked() || s2.resize_in_progress() {
                return;
            }
            if s2.blocks.get_untracked() != list {
                s2.blocks.set(list);
            }
        });
    }

    /// Component teardown: cancel the debounce and reconcile timers so
    /// no write or refresh lands after unmount.
    pub fn teardown(&self) {
        if let Some(win) = web_sys::window() {
            if let Some(tid) = self.resize_timer.get_value() {
                win.clear_timeout_with_handle(tid);
            }
            if let Some(tid) = self.reconcile_timer.get_value() {
                win.clear_interval_with_handle(tid);
            }
        }
        self.resize_timer.set_value(None);
        self.reconcile_timer.set_value(None);
        self.resize_session.set_value(None);
    }
}

/// How a failed remote write is absorbed locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FailureAction {
    /// Local state already matches what the failure implies; keep it.
    KeepLocal,
    /// Idempotent call, first transport failure; one scheduled retry.
    Retry,
    /// Restore the pre-mutation snapshot.
    Rollback,
}

/// Deletes are idempotent against the id: `NotFound` means the block is
/// already gone remotely, so the local removal stands.
fn delete_failure_action(kind: &ApiErrorKind, retried: bool) -> FailureAction {
    match kind {
        ApiErrorKind::NotFound => FailureAction::KeepLocal,
        ApiErrorKind::Network if !retried => FailureAction::Retry,
        _ => FailureAction::Rollback,
    }
}

/// Position and size writes retry once on a transport failure;
/// everything else rolls back.
fn update_failure_action(kind: &ApiErrorKind, retried: bool) -> FailureAction {
    match kind {
        ApiErrorKind::Network if !retried => FailureAction::Retry,
        _ => FailureAction::Rollback,
    }
}

/// Next preview size for a resize pointer position: the snapped
/// candidate, or `None` when it equals the current preview or does not
/// fit at the block's position. `None` schedules nothing, so a burst of
/// pointer moves that settles on one size produces one remote write.
fn preview_size(
    session: &ResizeSession,
    blocks: &[Block],
    client_x: f64,
    client_y: f64,
) -> Option<(i32, i32)> {
    let (sw, sh) = session.start_size;
    let (cand_w, cand_h) = candidate_size(
        sw,
        sh,
        client_x - session.pointer_start.0,
        client_y - session.pointer_start.1,
    );
    let (w, h) = snap_size(cand_w, cand_h);

    if (w, h) == session.current_preview_size {
        return None;
    }

    let b = blocks.iter().find(|b| b.id == session.anchor_block_id)?;
    if !is_valid_placement(
        b.position.x,
        b.position.y,
        w,
        h,
        Some(session.anchor_block_id.as_str()),
        blocks,
    ) {
        return None;
    }
    Some((w, h))
}

fn apply_update(b: &mut Block, updates: &BlockUpdate) {
    if let Some(kind) = updates.kind {
        b.kind = kind;
    }
    if let Some(content) = &updates.content {
        b.content = content.clone();
    }
    if let Some(style) = &updates.style {
        b.style = style.clone();
    }
    if let Some(p) = updates.position {
        if let Some(x) = p.x {
            b.position.x = x;
        }
        if let Some(y) = p.y {
            b.position.y = y;
        }
        if let Some(w) = p.w {
            b.position.w = w;
        }
        if let Some(h) = p.h {
            b.position.h = h;
        }
    }
}

fn schedule_timeout(ms: i32, f: impl FnOnce() + 'static) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let cb = wasm_bindgen::closure::Closure::once_into_js(f);
    let _ = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::state::AppState;

    fn block(id: &str, x: i32, y: i32, w: i32, h: i32) -> Block {
        Block {
            id: id.to_string(),
            kind: BlockKind::Text,
            content: String::new(),
            position: Position { x, y, w, h },
            is_center: false,
            style: BlockStyle::default(),
        }
    }

    // Hand-assembled controller: no reconcile worker, no storage reads,
    // so the guard paths run on the host target.
    fn controller_for(owner: &str, blocks: Vec<Block>) -> BlockSyncController {
        let app_state = AppContext(AppState {
            api_client: RwSignal::new(ApiClient::new("http://localhost:6689".to_string())),
            current_user: RwSignal::new(None),
        });
        BlockSyncController {
            app_state,
            owner: StoredValue::new(owner.to_string()),
            blocks: RwSignal::new(blocks),
            remote_snapshot: RwSignal::new(vec![]),
            loading: RwSignal::new(false),
            notice: RwSignal::new(None),
            drag_in_progress: RwSignal::new(false),
            resize_session: StoredValue::new(None),
            resize_timer: StoredValue::new(None),
            reconcile_timer: StoredValue::new(None),
        }
    }

    fn session_for(id: &str, start: (i32, i32), blocks: &[Block]) -> ResizeSession {
        ResizeSession {
            anchor_block_id: id.to_string(),
            pointer_start: (100.0, 100.0),
            start_size: start,
            current_preview_size: start,
            pre_session_blocks: blocks.to_vec(),
        }
    }

    #[test]
    fn foreign_identity_write_is_refused_before_any_mutation() {
        let c = controller_for("ada", vec![block("a", 0, 0, 1, 1)]);

        assert_eq!(
            c.authorize("mallory").unwrap_err().kind,
            ApiErrorKind::Unauthorized
        );
        assert!(c.authorize("ada").is_ok());

        c.add_block("mallory", 1, 0);
        c.delete_block("mallory", "a");
        c.drop_block("mallory", "a", 3, 3);
        assert_eq!(c.blocks.get_untracked(), vec![block("a", 0, 0, 1, 1)]);
    }

    #[test]
    fn drop_on_invalid_target_leaves_blocks_untouched() {
        let blocks = vec![block("a", 0, 0, 1, 1), block("b", 2, 0, 1, 1)];
        let c = controller_for("ada", blocks.clone());

        // Occupied target.
        c.drop_block("ada", "a", 2, 0);
        // Out of bounds.
        c.drop_block("ada", "a", 6, 0);
        assert_eq!(c.blocks.get_untracked(), blocks);
    }

    #[test]
    fn center_block_is_exempt_from_delete_and_retype() {
        let mut center = block("real-center", 2, 1, 2, 2);
        center.is_center = true;
        let c = controller_for("ada", vec![center.clone()]);

        c.delete_block("ada", "real-center");
        c.update_kind("ada", "real-center", BlockKind::Image);
        // The synthesized center has no persisted counterpart to edit.
        c.update_content("ada", CENTER_BLOCK_ID, "nope".to_string());
        assert_eq!(c.blocks.get_untracked(), vec![center]);
    }

    #[test]
    fn delete_not_found_keeps_local_removal() {
        assert_eq!(
            delete_failure_action(&ApiErrorKind::NotFound, false),
            FailureAction::KeepLocal
        );
        assert_eq!(
            delete_failure_action(&ApiErrorKind::NotFound, true),
            FailureAction::KeepLocal
        );
    }

    #[test]
    fn transport_failures_retry_once_then_roll_back() {
        assert_eq!(
            delete_failure_action(&ApiErrorKind::Network, false),
            FailureAction::Retry
        );
        assert_eq!(
            delete_failure_action(&ApiErrorKind::Network, true),
            FailureAction::Rollback
        );
        assert_eq!(
            update_failure_action(&ApiErrorKind::Network, false),
            FailureAction::Retry
        );
        assert_eq!(
            update_failure_action(&ApiErrorKind::Network, true),
            FailureAction::Rollback
        );
    }

    #[test]
    fn non_transport_failures_roll_back() {
        assert_eq!(
            delete_failure_action(&ApiErrorKind::Http, false),
            FailureAction::Rollback
        );
        assert_eq!(
            delete_failure_action(&ApiErrorKind::Unauthorized, false),
            FailureAction::Rollback
        );
        assert_eq!(
            update_failure_action(&ApiErrorKind::Http, false),
            FailureAction::Rollback
        );
        assert_eq!(
            update_failure_action(&ApiErrorKind::NotFound, false),
            FailureAction::Rollback
        );
    }

    #[test]
    fn rapid_resize_moves_collapse_to_the_final_size() {
        let blocks = vec![block("a", 0, 0, 2, 2)];
        let mut shown = blocks.clone();
        let mut session = session_for("a", (2, 2), &blocks);

        // Ten pointer samples marching 450px downward. Only the sample
        // crossing the 200px cell boundary changes the snapped size, so
        // only one write gets (re)scheduled, carrying the final size.
        let mut applied = 0;
        for i in 1..=10 {
            let y = 100.0 + f64::from(i) * 45.0;
            if let Some((w, h)) = preview_size(&session, &shown, 100.0, y) {
                shown[0].position.w = w;
                shown[0].position.h = h;
                session.current_preview_size = (w, h);
                applied += 1;
            }
        }

        assert_eq!(applied, 1);
        assert_eq!(session.current_preview_size, (2, 3));
    }

    #[test]
    fn resize_preview_skips_sizes_that_do_not_fit() {
        // "b" sits directly below "a"; growing to (2,3) would collide.
        let blocks = vec![block("a", 0, 0, 2, 2), block("b", 0, 2, 2, 1)];
        let session = session_for("a", (2, 2), &blocks);

        assert_eq!(preview_size(&session, &blocks, 100.0, 550.0), None);
        // Unchanged snap target schedules nothing either.
        assert_eq!(preview_size(&session, &blocks, 150.0, 120.0), None);
    }

    #[test]
    fn pending_debounced_write_counts_as_resize_activity() {
        let c = controller_for("ada", vec![block("a", 0, 0, 2, 2)]);
        assert!(!c.resize_in_progress());

        c.resize_timer.set_value(Some(7));
        assert!(c.resize_in_progress());

        c.resize_timer.set_value(None);
        let blocks = c.blocks.get_untracked();
        c.resize_session
            .set_value(Some(session_for("a", (2, 2), &blocks)));
        assert!(c.resize_in_progress());
    }

    #[test]
    fn apply_update_patches_only_supplied_fields() {
        let mut b = block("a", 0, 0, 2, 1);
        b.content = "hello".to_string();

        apply_update(&mut b, &BlockUpdate::moved_to(3, 2));
        assert_eq!(b.position, Position { x: 3, y: 2, w: 2, h: 1 });
        assert_eq!(b.content, "hello");

        apply_update(&mut b, &BlockUpdate::resized_to(2, 2));
        assert_eq!(b.position, Position { x: 3, y: 2, w: 2, h: 2 });
        assert_eq!(b.kind, BlockKind::Text);
    }
}
