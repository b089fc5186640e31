use crate::api::{
    ApiClient, Empire, EmpirePayload, Layer, LayerUpload, MetadataRecord, YearEra,
};
use crate::editor::{
    RowEditor, RowField, TextSource, ValidationError, sanitize_txt_name,
};
use crate::filter::{EmpireFilter, LayerFilter};
use crate::images::{ImageSession, PreviewId, PreviewRegistry, decode_preview};
use crate::merge::{MergeFallback, merge_rows};
use crate::meta::MetaBlob;
use crate::session::{Credentials, Session};
use crate::statics;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};

pub fn run_gui() -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 900.0]),
        ..Default::default()
    };
    let title = format!("{} {}", statics::EN_APP_TITLE, env!("CARGO_PKG_VERSION"));
    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(MapdeskApp::new(cc.egui_ctx.clone())))),
    )
}

type ApiOutcome = Result<String, crate::api::ApiError>;

/// Where a layer-detail fetch should land once it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerDetailTarget {
    Viewer,
    EditForm,
}

/// Results coming back from background request threads.
enum NetEvent {
    LoginChecked {
        creds: Credentials,
        result: Result<(), crate::api::ApiError>,
    },
    Empires(Result<Vec<Empire>, crate::api::ApiError>),
    EmpireDetail(Result<Empire, crate::api::ApiError>),
    EmpireSaved(ApiOutcome),
    EmpireDeleted(ApiOutcome),
    Layers(Result<Vec<Layer>, crate::api::ApiError>),
    LayerDetail {
        target: LayerDetailTarget,
        id: String,
        result: Result<Vec<Layer>, crate::api::ApiError>,
    },
    LayerSaved(ApiOutcome),
    LayerDeleted(ApiOutcome),
    MetadataMap(Result<HashMap<String, String>, crate::api::ApiError>),
    MetadataLoaded {
        empire_name: String,
        result: Result<MetadataRecord, crate::api::ApiError>,
    },
    MetadataCreated(Result<usize, crate::api::ApiError>),
    MetadataSaved(ApiOutcome),
    MetadataDeleted(ApiOutcome),
    ImageFetched {
        file_name: String,
        result: Result<Vec<u8>, crate::api::ApiError>,
    },
}

/// Every background result is stamped with the epoch that spawned it.
/// Closing an editing surface or logging out bumps the epoch, so results
/// that resolve afterwards are discarded instead of applied.
struct NetMessage {
    epoch: u64,
    event: NetEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Empires,
    Layers,
    Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum MetaMode {
    #[default]
    Create,
    Manage,
}

/// What a destructive click is waiting on confirmation for.
#[derive(Debug, Clone)]
enum ConfirmTarget {
    Empire(String),
    Layer(String),
}

#[derive(Default)]
struct EmpireFormState {
    open: bool,
    editing: Option<String>,
    name: String,
    start_year: String,
    start_era: String,
    end_year: String,
    end_era: String,
    content: TextSource,
    error: Option<String>,
    pending: bool,
}

impl EmpireFormState {
    fn blank() -> Self {
        Self {
            open: true,
            start_era: "BCE".to_string(),
            end_era: "BCE".to_string(),
            ..Default::default()
        }
    }

    fn for_edit(empire: &Empire) -> Self {
        let mut form = Self::blank();
        form.editing = Some(empire.object_id.clone());
        form.name = empire.empire_name.clone();
        form.start_year = empire.start_year.year.to_string();
        form.start_era = pick_era(&empire.start_year.era);
        form.end_year = empire.end_year.year.to_string();
        form.end_era = pick_era(&empire.end_year.era);
        form.content.text = empire
            .content_blob()
            .map(|b| b.display())
            .unwrap_or_default();
        form
    }
}

#[derive(Default)]
struct LayerFormState {
    open: bool,
    editing: Option<String>,
    name: String,
    layer_type: String,
    geo: TextSource,
    metadata: TextSource,
    error: Option<String>,
    pending: bool,
}

impl LayerFormState {
    fn blank() -> Self {
        Self {
            open: true,
            ..Default::default()
        }
    }

    fn for_edit(layer: &Layer) -> Self {
        let mut form = Self::blank();
        form.editing = Some(layer.id.clone());
        form.name = layer.layer_name.clone();
        form.layer_type = layer.layer_type.clone();
        form.geo.text = layer.geo_content.as_ref().map(MetaBlob::display).unwrap_or_default();
        form.metadata.text = layer
            .metadata_content
            .as_ref()
            .map(MetaBlob::display)
            .unwrap_or_default();
        form
    }
}

/// The metadata edit modal: one editing session over one record, owning its
/// merged rows and its image partitions. Dropped wholesale on close.
struct MetaModal {
    meta_id: String,
    empire_name: String,
    rows: RowEditor,
    images: ImageSession,
    loading_images: usize,
    saving: bool,
    error: Option<String>,
}

/// The main application state and GUI logic. Owns the session, the cached
/// record lists, the per-screen editing state, and the preview registry.
struct MapdeskApp {
    ctx: egui::Context,
    api: ApiClient,
    session: Session,
    tx: Sender<NetMessage>,
    rx: Receiver<NetMessage>,
    epoch: u64,

    screen: Screen,
    theme_dark: bool,
    primed: bool,
    status: String,
    last_error: Option<String>,
    confirm: Option<ConfirmTarget>,

    // Login.
    login_username: String,
    login_password: String,
    login_error: Option<String>,
    login_pending: bool,

    // Empires.
    empires: Vec<Empire>,
    empires_loading: bool,
    empire_filter: EmpireFilter,
    empire_viewer: Option<(String, String)>,
    empire_form: EmpireFormState,

    // Layers.
    layers: Vec<Layer>,
    layers_loading: bool,
    layer_filter_input: LayerFilter,
    layer_filter_applied: LayerFilter,
    layer_viewer: Option<Layer>,
    layer_view_loading: bool,
    layer_form: LayerFormState,

    // Metadata screen.
    meta_mode: MetaMode,
    meta_search: String,
    meta_map: HashMap<String, String>,
    meta_selected: Vec<String>,
    meta_rows: RowEditor,
    meta_create_images: ImageSession,
    meta_error: Option<String>,
    meta_busy: bool,
    meta_modal: Option<MetaModal>,

    registry: PreviewRegistry,
    textures: HashMap<PreviewId, egui::TextureHandle>,
}

fn pick_era(era: &str) -> String {
    if era == "CE" { "CE".to_string() } else { "BCE".to_string() }
}

fn parse_year(text: &str) -> Option<i32> {
    text.trim().parse::<i32>().ok()
}

fn year_label(y: &YearEra) -> String {
    format!("{} {}", y.year, y.era)
}

impl MapdeskApp {
    fn new(ctx: egui::Context) -> Self {
        let (tx, rx) = channel();
        Self {
            ctx,
            api: ApiClient::from_env(),
            session: Session::load_default(),
            tx,
            rx,
            epoch: 0,
            screen: Screen::default(),
            theme_dark: true,
            primed: false,
            status: String::new(),
            last_error: None,
            confirm: None,
            login_username: String::new(),
            login_password: String::new(),
            login_error: None,
            login_pending: false,
            empires: Vec::new(),
            empires_loading: false,
            empire_filter: EmpireFilter::default(),
            empire_viewer: None,
            empire_form: EmpireFormState::default(),
            layers: Vec::new(),
            layers_loading: false,
            layer_filter_input: LayerFilter::default(),
            layer_filter_applied: LayerFilter::default(),
            layer_viewer: None,
            layer_view_loading: false,
            layer_form: LayerFormState::default(),
            meta_mode: MetaMode::default(),
            meta_search: String::new(),
            meta_map: HashMap::new(),
            meta_selected: Vec::new(),
            meta_rows: RowEditor::canonical(),
            meta_create_images: ImageSession::default(),
            meta_error: None,
            meta_busy: false,
            meta_modal: None,
            registry: PreviewRegistry::default(),
            textures: HashMap::new(),
        }
    }

    /// Run a request on a background thread; the result comes back through
    /// the channel stamped with the current epoch.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&ApiClient) -> NetEvent + Send + 'static,
    {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        let epoch = self.epoch;
        std::thread::spawn(move || {
            let event = job(&api);
            let _ = tx.send(NetMessage { epoch, event });
            ctx.request_repaint();
        });
    }

    fn drain_events(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            if msg.epoch != self.epoch {
                // A surface that is no longer current; discard, never apply.
                continue;
            }
            self.apply_event(msg.event);
        }
    }

    fn apply_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::LoginChecked { creds, result } => {
                self.login_pending = false;
                match result {
                    Ok(()) => {
                        if let Err(e) = self.session.set(creds) {
                            self.last_error = Some(format!("Failed to store credentials: {e:#}"));
                        }
                        self.login_username.clear();
                        self.login_password.clear();
                        self.login_error = None;
                        self.primed = true;
                        self.refresh_empires();
                    }
                    Err(crate::api::ApiError::Network(_)) => {
                        self.login_error = Some(statics::EN_ERR_CONNECT.to_string());
                    }
                    Err(e) => {
                        self.login_error = Some(e.to_string());
                    }
                }
            }
            NetEvent::Empires(result) => {
                self.empires_loading = false;
                match result {
                    Ok(list) => self.empires = list,
                    Err(e) => {
                        self.last_error =
                            Some(format!("{}: {e}", statics::EN_ERR_FETCH_EMPIRES));
                    }
                }
            }
            NetEvent::EmpireDetail(result) => match result {
                Ok(empire) => {
                    let content = empire
                        .content_blob()
                        .map(|b| b.display())
                        .unwrap_or_else(|| statics::EN_NO_METADATA.to_string());
                    self.empire_viewer = Some((empire.empire_name, content));
                }
                Err(e) => {
                    self.last_error = Some(format!("{}: {e}", statics::EN_ERR_FETCH_EMPIRES));
                }
            },
            NetEvent::EmpireSaved(result) => {
                self.empire_form.pending = false;
                match result {
                    Ok(msg) => {
                        self.status = msg;
                        self.empire_form = EmpireFormState::default();
                        self.refresh_empires();
                    }
                    Err(e) => self.empire_form.error = Some(e.to_string()),
                }
            }
            NetEvent::EmpireDeleted(result) => match result {
                Ok(msg) => {
                    self.status = msg;
                    self.refresh_empires();
                }
                Err(e) => {
                    self.last_error = Some(format!("{} {e}", statics::EN_ERR_DELETE_EMPIRE));
                }
            },
            NetEvent::Layers(result) => {
                self.layers_loading = false;
                match result {
                    Ok(list) => self.layers = list,
                    Err(e) => {
                        self.last_error = Some(format!("{}: {e}", statics::EN_ERR_FETCH_LAYERS));
                    }
                }
            }
            NetEvent::LayerDetail { target, id, result } => {
                self.layer_view_loading = false;
                match result {
                    Ok(list) => {
                        // The search may return several rows; prefer the one
                        // we asked about, fall back to the first.
                        let detail = list
                            .iter()
                            .find(|l| l.id == id)
                            .or_else(|| list.first())
                            .cloned();
                        match (detail, target) {
                            (Some(layer), LayerDetailTarget::Viewer) => {
                                self.layer_viewer = Some(layer);
                            }
                            (Some(layer), LayerDetailTarget::EditForm) => {
                                self.layer_form = LayerFormState::for_edit(&layer);
                            }
                            (None, _) => {
                                self.last_error = Some(statics::EN_ERR_FETCH_LAYERS.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        self.last_error = Some(format!("{}: {e}", statics::EN_ERR_FETCH_LAYERS));
                    }
                }
            }
            NetEvent::LayerSaved(result) => {
                self.layer_form.pending = false;
                match result {
                    Ok(msg) => {
                        self.status = msg;
                        self.layer_form = LayerFormState::default();
                        self.refresh_layers();
                    }
                    Err(e) => self.layer_form.error = Some(e.to_string()),
                }
            }
            NetEvent::LayerDeleted(result) => match result {
                Ok(msg) => {
                    self.status = msg;
                    self.refresh_layers();
                }
                Err(e) => {
                    self.last_error = Some(format!("{} {e}", statics::EN_ERR_DELETE_LAYER));
                }
            },
            NetEvent::MetadataMap(result) => match result {
                Ok(map) => self.meta_map = map,
                Err(e) => {
                    self.last_error = Some(format!("{}: {e}", statics::EN_ERR_FETCH_METADATA));
                }
            },
            NetEvent::MetadataLoaded { empire_name, result } => match result {
                Ok(record) => {
                    // A modal that was still open releases its previews first.
                    self.close_meta_modal();
                    let stored = record.blob.as_ref().and_then(MetaBlob::as_json);
                    let rows = merge_rows(
                        stored,
                        statics::CANONICAL_FIELDS,
                        MergeFallback::CanonicalDefaults,
                    );
                    let images = ImageSession::hydrate(&record.image_file_ids);
                    let loading_images = record.image_file_ids.len();
                    for file_name in &record.image_file_ids {
                        let file_name = file_name.clone();
                        self.spawn(move |api| NetEvent::ImageFetched {
                            result: api.fetch_image(&file_name),
                            file_name,
                        });
                    }
                    self.meta_modal = Some(MetaModal {
                        meta_id: record.id,
                        empire_name,
                        rows: RowEditor::from_rows(rows),
                        images,
                        loading_images,
                        saving: false,
                        error: None,
                    });
                }
                Err(e) => {
                    self.last_error = Some(format!("{}: {e}", statics::EN_ERR_VIEW_METADATA));
                }
            },
            NetEvent::MetadataCreated(result) => {
                self.meta_busy = false;
                match result {
                    Ok(count) => {
                        self.status =
                            format!("{} ({count})", statics::EN_STATUS_CREATED_METADATA);
                        self.meta_rows = RowEditor::canonical();
                        self.meta_create_images.close(&mut self.registry);
                        self.prune_textures();
                        self.meta_selected.clear();
                        self.meta_error = None;
                    }
                    Err(e) => {
                        // Records created before the failure stay committed;
                        // the refreshed list below shows what went through.
                        self.meta_error =
                            Some(format!("{}: {e}", statics::EN_ERR_CREATE_METADATA));
                    }
                }
                self.refresh_empires();
                self.refresh_metadata_map();
            }
            NetEvent::MetadataSaved(result) => {
                match result {
                    Ok(_) => {
                        self.status = statics::EN_STATUS_UPDATED_METADATA.to_string();
                        self.close_meta_modal();
                        self.refresh_empires();
                        self.refresh_metadata_map();
                    }
                    Err(e) => {
                        // Keep the whole session intact so a retry needs no
                        // re-staging.
                        if let Some(modal) = self.meta_modal.as_mut() {
                            modal.saving = false;
                            modal.error =
                                Some(format!("{} {e}", statics::EN_ERR_UPDATE_METADATA));
                        }
                    }
                }
            }
            NetEvent::MetadataDeleted(result) => match result {
                Ok(_) => {
                    self.status = statics::EN_STATUS_DELETED_METADATA.to_string();
                    self.refresh_empires();
                    self.refresh_metadata_map();
                }
                Err(e) => {
                    self.last_error = Some(format!("{} {e}", statics::EN_ERR_DELETE_METADATA));
                }
            },
            NetEvent::ImageFetched { file_name, result } => {
                let Some(modal) = self.meta_modal.as_mut() else {
                    return;
                };
                modal.loading_images = modal.loading_images.saturating_sub(1);
                // Fetch failures leave the identifier previewless; the grid
                // still shows it and removal still works.
                if let Ok(bytes) = result
                    && let Ok(preview) = decode_preview(&bytes)
                {
                    let id = self.registry.acquire(preview);
                    modal.images.attach_preview(&file_name, id);
                }
            }
        }
    }

    // --- fetch triggers ---

    fn refresh_empires(&mut self) {
        self.empires_loading = true;
        self.spawn(|api| NetEvent::Empires(api.list_empires()));
    }

    fn refresh_layers(&mut self) {
        self.layers_loading = true;
        self.spawn(|api| NetEvent::Layers(api.list_layers()));
    }

    fn refresh_metadata_map(&mut self) {
        self.spawn(|api| NetEvent::MetadataMap(api.metadata_map()));
    }

    fn switch_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        // Anything still in flight belongs to the previous surface.
        self.epoch += 1;
        self.screen = screen;
        self.empires_loading = false;
        self.layers_loading = false;
        self.layer_view_loading = false;
        match screen {
            Screen::Empires => self.refresh_empires(),
            Screen::Layers => self.refresh_layers(),
            Screen::Metadata => {
                self.refresh_empires();
                self.refresh_metadata_map();
            }
        }
    }

    fn logout(&mut self) {
        self.epoch += 1;
        self.session.clear();
        self.screen = Screen::Empires;
        self.primed = true;
        self.empires_loading = false;
        self.layers_loading = false;
        self.layer_view_loading = false;
        self.meta_busy = false;
        self.login_pending = false;
        self.empires.clear();
        self.layers.clear();
        self.meta_map.clear();
        self.meta_selected.clear();
        self.meta_rows = RowEditor::canonical();
        self.meta_create_images.close(&mut self.registry);
        self.close_meta_modal();
        self.empire_form = EmpireFormState::default();
        self.layer_form = LayerFormState::default();
        self.empire_viewer = None;
        self.layer_viewer = None;
        self.confirm = None;
        self.status.clear();
        self.last_error = None;
    }

    fn close_meta_modal(&mut self) {
        if let Some(mut modal) = self.meta_modal.take() {
            modal.images.close(&mut self.registry);
        }
        self.prune_textures();
    }

    /// Drop GPU textures whose preview handle has been released.
    fn prune_textures(&mut self) {
        let registry = &self.registry;
        self.textures.retain(|id, _| registry.get(*id).is_some());
    }

    fn texture_for(&mut self, id: PreviewId) -> Option<egui::TextureHandle> {
        if let Some(tex) = self.textures.get(&id) {
            return Some(tex.clone());
        }
        let preview = self.registry.get(id)?;
        let color = egui::ColorImage::from_rgba_unmultiplied(
            [preview.width as usize, preview.height as usize],
            &preview.rgba,
        );
        let tex = self
            .ctx
            .load_texture(format!("preview-{id:?}"), color, egui::TextureOptions::LINEAR);
        self.textures.insert(id, tex.clone());
        Some(tex)
    }

    // --- actions ---

    fn submit_login(&mut self) {
        let creds = Credentials {
            username: self.login_username.trim().to_string(),
            password: self.login_password.clone(),
        };
        if !creds.is_filled() {
            self.login_error = Some(statics::EN_ERR_MISSING_CREDS.to_string());
            return;
        }
        self.login_error = None;
        self.login_pending = true;
        self.spawn(move |api| NetEvent::LoginChecked {
            result: api.validate_creds(&creds),
            creds,
        });
    }

    fn submit_empire_form(&mut self) {
        let form = &mut self.empire_form;
        form.error = None;

        if form.name.trim().is_empty()
            || form.start_year.trim().is_empty()
            || form.end_year.trim().is_empty()
            || form.content.text.trim().is_empty()
        {
            form.error = Some(statics::EN_ERR_FILL_ALL_FIELDS.to_string());
            return;
        }
        let (Some(start), Some(end)) = (parse_year(&form.start_year), parse_year(&form.end_year))
        else {
            form.error = Some(statics::EN_ERR_FILL_ALL_FIELDS.to_string());
            return;
        };
        let content = match crate::editor::parse_raw(&form.content.text) {
            Ok(v) => v,
            Err(_) => {
                form.error = Some(statics::EN_ERR_INVALID_GEOJSON.to_string());
                return;
            }
        };

        let payload = EmpirePayload {
            empire_name: form.name.trim().to_string(),
            start_year: YearEra {
                year: start,
                era: form.start_era.clone(),
            },
            end_year: YearEra {
                year: end,
                era: form.end_era.clone(),
            },
            content,
            object_id: form.editing.clone(),
        };
        form.pending = true;
        let editing = form.editing.is_some();
        self.spawn(move |api| {
            let result = if editing {
                api.update_empire(&payload)
            } else {
                api.create_empire(&payload)
            };
            NetEvent::EmpireSaved(result)
        });
    }

    fn submit_layer_form(&mut self) {
        let form = &mut self.layer_form;
        form.error = None;

        if form.name.trim().is_empty() || form.layer_type.trim().is_empty() {
            form.error = Some(statics::EN_ERR_FILL_NAME_TYPE.to_string());
            return;
        }
        if form.editing.is_none() && form.geo.is_empty() {
            form.error = Some(statics::EN_ERR_GEO_CONTENT_REQUIRED.to_string());
            return;
        }

        let metadata = if form.metadata.text.trim().is_empty() {
            None
        } else {
            let name = match &form.metadata.file {
                Some(path) => sanitize_txt_name(
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(statics::FILE_DEFAULT_METADATA_TXT),
                ),
                None => statics::FILE_DEFAULT_METADATA_TXT.to_string(),
            };
            Some((name, form.metadata.text.clone()))
        };

        let upload = LayerUpload {
            layer_name: form.name.trim().to_string(),
            layer_type: form.layer_type.trim().to_string(),
            geo_name: form.geo.upload_name(statics::FILE_DEFAULT_GEO),
            geo_text: form.geo.text.clone(),
            metadata,
        };
        form.pending = true;
        let editing = form.editing.clone();
        self.spawn(move |api| {
            let result = match &editing {
                Some(id) => api.update_layer(id, &upload),
                None => api.create_layer(&upload),
            };
            NetEvent::LayerSaved(result)
        });
    }

    fn open_layer_detail(&mut self, layer: &Layer, target: LayerDetailTarget) {
        self.layer_view_loading = true;
        if target == LayerDetailTarget::Viewer {
            self.layer_viewer = None;
        }
        let name = layer.layer_name.clone();
        let kind = layer.layer_type.clone();
        let id = layer.id.clone();
        self.spawn(move |api| NetEvent::LayerDetail {
            target,
            result: api.search_layers(&name, &kind),
            id,
        });
    }

    fn open_metadata_modal(&mut self, object_id: &str, empire_name: &str) {
        let Some(meta_id) = self.meta_map.get(object_id).cloned() else {
            self.meta_error = Some(statics::EN_ERR_META_MAPPING.to_string());
            return;
        };
        self.meta_error = None;
        let empire_name = empire_name.to_string();
        self.spawn(move |api| NetEvent::MetadataLoaded {
            result: api.metadata_by_id(&meta_id),
            empire_name,
        });
    }

    fn delete_metadata(&mut self, object_id: &str) {
        let Some(meta_id) = self.meta_map.get(object_id).cloned() else {
            self.meta_error = Some(statics::EN_ERR_META_MAPPING.to_string());
            return;
        };
        self.spawn(move |api| NetEvent::MetadataDeleted(api.delete_metadata(&meta_id)));
    }

    /// Sequential batch create: one full request/response cycle per selected
    /// empire. The first failure aborts the rest; earlier creations stand.
    fn submit_metadata_create(&mut self) {
        self.meta_error = None;
        if self.meta_selected.is_empty() {
            self.meta_error = Some(statics::EN_ERR_NO_EMPIRES_SELECTED.to_string());
            return;
        }
        let details = match self.meta_rows.serialize_for_create() {
            Ok(v) => v,
            Err(ValidationError::NoData) => {
                self.meta_error = Some(statics::EN_ERR_FILL_ONE_VALUE.to_string());
                return;
            }
            Err(e) => {
                self.meta_error = Some(e.to_string());
                return;
            }
        };
        let ids = self.meta_selected.clone();
        let images = self.meta_create_images.pending_addition.clone();
        self.meta_busy = true;
        self.spawn(move |api| {
            let mut created = 0usize;
            for object_id in &ids {
                if let Err(e) = api.create_metadata(object_id, &details, &images) {
                    return NetEvent::MetadataCreated(Err(e));
                }
                created += 1;
            }
            NetEvent::MetadataCreated(Ok(created))
        });
    }

    fn submit_metadata_update(&mut self) {
        let Some(modal) = self.meta_modal.as_mut() else {
            return;
        };
        if modal.meta_id.is_empty() {
            modal.error = Some(statics::EN_ERR_MISSING_META_ID.to_string());
            return;
        }
        modal.error = None;
        modal.saving = true;
        let id = modal.meta_id.clone();
        let details = modal.rows.serialize_for_update();
        let new_files = modal.images.pending_addition.clone();
        let remove_ids = modal.images.build_diff().remove_ids.to_vec();
        self.spawn(move |api| {
            let diff = crate::images::ImageDiff {
                new_files: &new_files,
                remove_ids: &remove_ids,
            };
            NetEvent::MetadataSaved(api.update_metadata(&id, &details, &diff))
        });
    }

    fn stage_picked_images(session: &mut ImageSession, registry: &mut PreviewRegistry) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_files()
        else {
            return;
        };
        for path in paths {
            if let Ok(bytes) = std::fs::read(&path) {
                session.stage_addition(&path, bytes, registry);
            }
        }
    }

    // --- rendering ---

    fn render_login(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.heading(statics::EN_LOGIN_HEADING);
            ui.add_space(12.0);
            if let Some(err) = &self.login_error {
                ui.colored_label(egui::Color32::RED, err);
                ui.add_space(4.0);
            }
            ui.add(
                egui::TextEdit::singleline(&mut self.login_username)
                    .hint_text(statics::EN_HINT_USERNAME),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.login_password)
                    .hint_text(statics::EN_HINT_PASSWORD)
                    .password(true),
            );
            ui.add_space(8.0);
            let clicked = ui
                .add_enabled(!self.login_pending, egui::Button::new(statics::EN_BTN_LOGIN))
                .clicked();
            let submitted = ui.input(|i| i.key_pressed(egui::Key::Enter));
            if self.login_pending {
                ui.spinner();
            } else if clicked || submitted {
                self.submit_login();
            }
        });
    }

    fn render_empires(&mut self, ui: &mut egui::Ui) {
        ui.heading(statics::EN_HEADING_EMPIRES);
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.empire_filter.name)
                    .desired_width(160.0)
                    .hint_text(statics::EN_HINT_FILTER_NAME),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.empire_filter.year)
                    .desired_width(120.0)
                    .hint_text(statics::EN_HINT_FILTER_YEAR),
            );
            egui::ComboBox::from_id_salt("empire_era_filter")
                .selected_text(if self.empire_filter.era.is_empty() {
                    statics::EN_LABEL_ALL_ERAS
                } else {
                    self.empire_filter.era.as_str()
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(
                        &mut self.empire_filter.era,
                        String::new(),
                        statics::EN_LABEL_ALL_ERAS,
                    );
                    ui.selectable_value(&mut self.empire_filter.era, "BCE".to_string(), "BCE");
                    ui.selectable_value(&mut self.empire_filter.era, "CE".to_string(), "CE");
                });
            if ui.button(statics::EN_BTN_REFRESH).clicked() {
                self.refresh_empires();
            }
            if ui.button(statics::EN_HEADING_NEW_EMPIRE).clicked() {
                self.empire_form = EmpireFormState::blank();
            }
        });
        ui.separator();

        if self.empires_loading {
            ui.label(statics::EN_LOADING);
            return;
        }

        // Live filtering: recomputed every frame, plain linear scan.
        let filtered: Vec<Empire> = self
            .empires
            .iter()
            .filter(|e| self.empire_filter.matches(e))
            .cloned()
            .collect();

        if filtered.is_empty() {
            ui.label(statics::EN_EMPTY_LIST);
            return;
        }

        enum RowAction {
            View(usize),
            Edit(usize),
            AskDelete(String),
        }
        let mut action: Option<RowAction> = None;

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(statics::EN_COL_EMPIRE_NAME);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_START_YEAR);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_END_YEAR);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_ID);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_ACTIONS);
                });
            })
            .body(|mut body| {
                for (idx, empire) in filtered.iter().enumerate() {
                    body.row(22.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&empire.empire_name);
                        });
                        row.col(|ui| {
                            ui.label(year_label(&empire.start_year));
                        });
                        row.col(|ui| {
                            ui.label(year_label(&empire.end_year));
                        });
                        row.col(|ui| {
                            ui.label(egui::RichText::new(&empire.object_id).monospace());
                        });
                        row.col(|ui| {
                            if ui.small_button(statics::EN_BTN_VIEW).clicked() {
                                action = Some(RowAction::View(idx));
                            }
                            if ui.small_button(statics::EN_BTN_EDIT).clicked() {
                                action = Some(RowAction::Edit(idx));
                            }
                            if ui.small_button(statics::EN_BTN_DELETE).clicked() {
                                action = Some(RowAction::AskDelete(empire.object_id.clone()));
                            }
                        });
                    });
                }
            });

        match action {
            Some(RowAction::View(idx)) => {
                // The list copy may be stale; fetch the record fresh.
                let object_id = filtered[idx].object_id.clone();
                self.spawn(move |api| NetEvent::EmpireDetail(api.get_empire(&object_id)));
            }
            Some(RowAction::Edit(idx)) => {
                self.empire_form = EmpireFormState::for_edit(&filtered[idx]);
            }
            Some(RowAction::AskDelete(object_id)) => {
                self.confirm = Some(ConfirmTarget::Empire(object_id));
            }
            None => {}
        }
    }

    fn render_empire_viewer(&mut self, ctx: &egui::Context) {
        let Some((name, content)) = self.empire_viewer.clone() else {
            return;
        };
        let mut open = true;
        let mut close_clicked = false;
        egui::Window::new(format!("{name} {}", statics::EN_HEADING_GEO_CONTENT))
            .collapsible(false)
            .open(&mut open)
            .default_size([520.0, 480.0])
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(400.0).show(ui, |ui| {
                    ui.label(egui::RichText::new(content).monospace());
                });
                ui.separator();
                close_clicked = ui.button(statics::EN_BTN_CLOSE).clicked();
            });
        if !open || close_clicked {
            self.empire_viewer = None;
        }
    }

    fn render_empire_form(&mut self, ctx: &egui::Context) {
        if !self.empire_form.open {
            return;
        }
        let heading = if self.empire_form.editing.is_some() {
            statics::EN_HEADING_EDIT_EMPIRE
        } else {
            statics::EN_HEADING_NEW_EMPIRE
        };
        let mut open = true;
        let mut submit = false;
        egui::Window::new(heading)
            .collapsible(false)
            .open(&mut open)
            .default_width(480.0)
            .show(ctx, |ui| {
                let form = &mut self.empire_form;
                if let Some(err) = &form.error {
                    ui.colored_label(egui::Color32::RED, err);
                }
                ui.add(
                    egui::TextEdit::singleline(&mut form.name)
                        .hint_text(statics::EN_HINT_EMPIRE_NAME),
                );
                ui.horizontal(|ui| {
                    ui.label(statics::EN_LABEL_START_YEAR);
                    ui.add(
                        egui::TextEdit::singleline(&mut form.start_year).desired_width(80.0),
                    );
                    egui::ComboBox::from_id_salt("start_era")
                        .selected_text(&form.start_era)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut form.start_era, "BCE".to_string(), "BCE");
                            ui.selectable_value(&mut form.start_era, "CE".to_string(), "CE");
                        });
                    ui.label(statics::EN_LABEL_END_YEAR);
                    ui.add(egui::TextEdit::singleline(&mut form.end_year).desired_width(80.0));
                    egui::ComboBox::from_id_salt("end_era")
                        .selected_text(&form.end_era)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut form.end_era, "BCE".to_string(), "BCE");
                            ui.selectable_value(&mut form.end_era, "CE".to_string(), "CE");
                        });
                });
                ui.label(statics::EN_HEADING_GEO_CONTENT);
                egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut form.content.text)
                            .code_editor()
                            .desired_rows(8)
                            .desired_width(f32::INFINITY)
                            .hint_text(statics::EN_HINT_GEO_CONTENT),
                    );
                });
                ui.horizontal(|ui| {
                    if ui.button(statics::EN_BTN_CHOOSE_FILE).clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter("GeoJSON", &["json", "geojson"])
                            .pick_file()
                        && let Err(e) = form.content.pick_file(&path)
                    {
                        form.error = Some(format!("{e:#}"));
                    }
                    if let Some(path) = &form.content.file
                        && let Some(name) = path.file_name()
                    {
                        ui.label(format!(
                            "{} {}",
                            statics::EN_LABEL_SELECTED_FILE,
                            name.to_string_lossy()
                        ));
                    }
                });
                ui.separator();
                let label = if form.editing.is_some() {
                    statics::EN_BTN_UPDATE
                } else {
                    statics::EN_BTN_UPLOAD
                };
                if ui
                    .add_enabled(!form.pending, egui::Button::new(label))
                    .clicked()
                {
                    submit = true;
                }
                if form.pending {
                    ui.spinner();
                }
            });
        if submit {
            self.submit_empire_form();
        }
        if !open {
            self.empire_form = EmpireFormState::default();
        }
    }

    fn render_layers(&mut self, ui: &mut egui::Ui) {
        ui.heading(statics::EN_HEADING_LAYERS);
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.layer_filter_input.name)
                    .desired_width(160.0)
                    .hint_text(statics::EN_HINT_FILTER_LAYER_NAME),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.layer_filter_input.layer_type)
                    .desired_width(160.0)
                    .hint_text(statics::EN_HINT_FILTER_LAYER_TYPE),
            );
            // Filters only apply on explicit search, unlike the empire list.
            let searching = self.layers_loading || self.layer_view_loading;
            if ui
                .add_enabled(!searching, egui::Button::new(statics::EN_BTN_SEARCH))
                .clicked()
            {
                self.layer_filter_applied = self.layer_filter_input.clone();
            }
            if ui.button(statics::EN_BTN_RESET).clicked() {
                self.layer_filter_input = LayerFilter::default();
                self.layer_filter_applied = LayerFilter::default();
            }
            if ui.button(statics::EN_BTN_REFRESH).clicked() {
                self.refresh_layers();
            }
            if ui.button(statics::EN_BTN_NEW_LAYER).clicked() {
                self.layer_form = LayerFormState::blank();
            }
        });
        ui.separator();

        if self.layers_loading {
            ui.label(statics::EN_LOADING);
            return;
        }

        let filtered: Vec<Layer> = self
            .layers
            .iter()
            .filter(|l| self.layer_filter_applied.matches(l))
            .cloned()
            .collect();

        if filtered.is_empty() {
            ui.label(statics::EN_EMPTY_LIST);
            return;
        }

        enum RowAction {
            View(usize),
            Edit(usize),
            AskDelete(String),
        }
        let mut action: Option<RowAction> = None;

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(statics::EN_COL_LAYER_NAME);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_LAYER_TYPE);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_ID);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_UPDATED);
                });
                header.col(|ui| {
                    ui.strong(statics::EN_COL_ACTIONS);
                });
            })
            .body(|mut body| {
                for (idx, layer) in filtered.iter().enumerate() {
                    body.row(22.0, |mut row| {
                        row.col(|ui| {
                            ui.label(non_empty(&layer.layer_name));
                        });
                        row.col(|ui| {
                            ui.label(non_empty(&layer.layer_type));
                        });
                        row.col(|ui| {
                            ui.label(egui::RichText::new(&layer.id).monospace());
                        });
                        row.col(|ui| {
                            ui.label(layer.updated_at.as_deref().unwrap_or(statics::EN_DASH));
                        });
                        row.col(|ui| {
                            let busy = self.layer_view_loading;
                            if ui
                                .add_enabled(!busy, egui::Button::new(statics::EN_BTN_VIEW).small())
                                .clicked()
                            {
                                action = Some(RowAction::View(idx));
                            }
                            if ui
                                .add_enabled(!busy, egui::Button::new(statics::EN_BTN_EDIT).small())
                                .clicked()
                            {
                                action = Some(RowAction::Edit(idx));
                            }
                            if ui.small_button(statics::EN_BTN_DELETE).clicked() {
                                action = Some(RowAction::AskDelete(layer.id.clone()));
                            }
                        });
                    });
                }
            });

        match action {
            Some(RowAction::View(idx)) => {
                self.open_layer_detail(&filtered[idx], LayerDetailTarget::Viewer);
            }
            Some(RowAction::Edit(idx)) => {
                self.open_layer_detail(&filtered[idx], LayerDetailTarget::EditForm);
            }
            Some(RowAction::AskDelete(id)) => {
                self.confirm = Some(ConfirmTarget::Layer(id));
            }
            None => {}
        }
    }

    fn render_layer_viewer(&mut self, ctx: &egui::Context) {
        let Some(layer) = self.layer_viewer.clone() else {
            if self.layer_view_loading {
                egui::Window::new(statics::EN_HEADING_LAYERS)
                    .collapsible(false)
                    .show(ctx, |ui| {
                        ui.label(statics::EN_LOADING);
                    });
            }
            return;
        };
        let mut open = true;
        let mut close_clicked = false;
        egui::Window::new(format!("{} ({})", layer.layer_name, layer.layer_type))
            .collapsible(false)
            .open(&mut open)
            .default_size([540.0, 560.0])
            .show(ctx, |ui| {
                ui.strong(statics::EN_HEADING_LAYER_METADATA);
                egui::ScrollArea::vertical()
                    .id_salt("layer_meta_pane")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        let text = layer
                            .metadata_content
                            .as_ref()
                            .map(MetaBlob::display)
                            .unwrap_or_else(|| statics::EN_NO_METADATA.to_string());
                        ui.label(egui::RichText::new(text).monospace());
                    });
                ui.separator();
                ui.strong(statics::EN_HEADING_GEO_CONTENT);
                egui::ScrollArea::vertical()
                    .id_salt("layer_geo_pane")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        let text = layer
                            .geo_content
                            .as_ref()
                            .map(MetaBlob::display)
                            .unwrap_or_else(|| "{}".to_string());
                        ui.label(egui::RichText::new(text).monospace());
                    });
                ui.separator();
                close_clicked = ui.button(statics::EN_BTN_CLOSE).clicked();
            });
        if !open || close_clicked {
            self.layer_viewer = None;
        }
    }

    fn render_layer_form(&mut self, ctx: &egui::Context) {
        if !self.layer_form.open {
            return;
        }
        let heading = if self.layer_form.editing.is_some() {
            statics::EN_HEADING_EDIT_LAYER
        } else {
            statics::EN_HEADING_NEW_LAYER
        };
        let mut open = true;
        let mut submit = false;
        egui::Window::new(heading)
            .collapsible(false)
            .open(&mut open)
            .default_width(500.0)
            .show(ctx, |ui| {
                let form = &mut self.layer_form;
                if let Some(err) = &form.error {
                    ui.colored_label(egui::Color32::RED, err);
                }
                ui.add(
                    egui::TextEdit::singleline(&mut form.name)
                        .hint_text(statics::EN_HINT_LAYER_NAME),
                );
                ui.add(
                    egui::TextEdit::singleline(&mut form.layer_type)
                        .hint_text(statics::EN_HINT_LAYER_TYPE),
                );

                ui.label(statics::EN_HEADING_GEO_CONTENT);
                egui::ScrollArea::vertical()
                    .id_salt("layer_form_geo")
                    .max_height(180.0)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut form.geo.text)
                                .code_editor()
                                .desired_rows(6)
                                .desired_width(f32::INFINITY)
                                .hint_text(statics::EN_HINT_GEO_CONTENT),
                        );
                    });
                ui.horizontal(|ui| {
                    if ui.button(statics::EN_BTN_CHOOSE_FILE).clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter("GeoJSON", &["json", "geojson"])
                            .pick_file()
                        && let Err(e) = form.geo.pick_file(&path)
                    {
                        form.error = Some(format!("{e:#}"));
                    }
                    if let Some(path) = &form.geo.file
                        && let Some(name) = path.file_name()
                    {
                        ui.label(format!(
                            "{} {}",
                            statics::EN_LABEL_SELECTED_FILE,
                            name.to_string_lossy()
                        ));
                    }
                });

                ui.label(statics::EN_LABEL_METADATA_OPTIONAL);
                egui::ScrollArea::vertical()
                    .id_salt("layer_form_meta")
                    .max_height(140.0)
                    .show(ui, |ui| {
                        let mut text = form.metadata.text.clone();
                        let resp = ui.add(
                            egui::TextEdit::multiline(&mut text)
                                .desired_rows(4)
                                .desired_width(f32::INFINITY)
                                .hint_text(statics::EN_HINT_LAYER_METADATA),
                        );
                        if resp.changed() {
                            // Manual edits revoke the picked .txt file.
                            form.metadata.edit_text(text);
                        }
                    });
                ui.horizontal(|ui| {
                    if ui.button(statics::EN_BTN_CHOOSE_TXT_FILE).clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter("Text", &["txt"])
                            .pick_file()
                    {
                        match form.metadata.pick_txt_file(&path) {
                            Ok(()) => form.error = None,
                            Err(ValidationError::WrongFileType { .. }) => {
                                form.error = Some(statics::EN_ERR_TXT_ONLY.to_string());
                            }
                            Err(e) => form.error = Some(e.to_string()),
                        }
                    }
                    if let Some(path) = &form.metadata.file
                        && let Some(name) = path.file_name()
                    {
                        ui.label(format!(
                            "{} {}",
                            statics::EN_LABEL_SELECTED_FILE,
                            name.to_string_lossy()
                        ));
                    }
                });

                ui.separator();
                let label = if form.editing.is_some() {
                    statics::EN_BTN_UPDATE
                } else {
                    statics::EN_BTN_UPLOAD
                };
                if ui
                    .add_enabled(!form.pending, egui::Button::new(label))
                    .clicked()
                {
                    submit = true;
                }
                if form.pending {
                    ui.spinner();
                }
            });
        if submit {
            self.submit_layer_form();
        }
        if !open {
            self.layer_form = LayerFormState::default();
        }
    }

    fn render_metadata(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.meta_search)
                    .desired_width(220.0)
                    .hint_text(statics::EN_HINT_SEARCH_EMPIRES),
            );
            let switch_label = match self.meta_mode {
                MetaMode::Create => statics::EN_LABEL_SWITCH_TO_MANAGE,
                MetaMode::Manage => statics::EN_LABEL_SWITCH_TO_CREATE,
            };
            if ui.button(switch_label).clicked() {
                self.meta_mode = match self.meta_mode {
                    MetaMode::Create => MetaMode::Manage,
                    MetaMode::Manage => MetaMode::Create,
                };
                self.meta_error = None;
                self.meta_rows = RowEditor::canonical();
            }
            if ui.button(statics::EN_BTN_REFRESH).clicked() {
                self.refresh_empires();
                self.refresh_metadata_map();
            }
        });
        if let Some(err) = self.meta_error.clone() {
            ui.colored_label(egui::Color32::RED, err);
        }
        ui.separator();

        let search = self.meta_search.trim().to_lowercase();
        let name_matches = |e: &Empire| {
            search.is_empty() || e.empire_name.to_lowercase().contains(&search)
        };

        match self.meta_mode {
            MetaMode::Create => {
                let unassigned: Vec<Empire> = self
                    .empires
                    .iter()
                    .filter(|e| name_matches(e) && !self.meta_map.contains_key(&e.object_id))
                    .cloned()
                    .collect();
                self.render_metadata_create(ui, &unassigned);
            }
            MetaMode::Manage => {
                let assigned: Vec<Empire> = self
                    .empires
                    .iter()
                    .filter(|e| name_matches(e) && self.meta_map.contains_key(&e.object_id))
                    .cloned()
                    .collect();
                self.render_metadata_manage(ui, &assigned);
            }
        }
    }

    fn render_metadata_create(&mut self, ui: &mut egui::Ui, unassigned: &[Empire]) {
        ui.strong(statics::EN_HEADING_CREATE_METADATA);
        row_editor_ui(ui, &mut self.meta_rows, "create_rows");

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.strong(statics::EN_HEADING_IMAGES);
            if ui.button(statics::EN_BTN_ADD_IMAGES).clicked() {
                Self::stage_picked_images(&mut self.meta_create_images, &mut self.registry);
            }
        });
        let mut unstage: Option<usize> = None;
        ui.horizontal_wrapped(|ui| {
            for idx in 0..self.meta_create_images.pending_addition.len() {
                let preview = self.meta_create_images.pending_addition[idx].preview;
                let name = self.meta_create_images.pending_addition[idx].file_name.clone();
                ui.vertical(|ui| {
                    if let Some(tex) = preview.and_then(|id| self.texture_for(id)) {
                        ui.add(
                            egui::Image::new(&tex)
                                .fit_to_exact_size(egui::vec2(72.0, 72.0)),
                        );
                    } else {
                        ui.label(egui::RichText::new(&name).small());
                    }
                    if ui.small_button(statics::EN_BTN_DELETE).clicked() {
                        unstage = Some(idx);
                    }
                });
            }
        });
        if let Some(idx) = unstage {
            self.meta_create_images.unstage_addition(idx, &mut self.registry);
            self.prune_textures();
        }

        ui.add_space(6.0);
        if ui
            .add_enabled(
                !self.meta_busy,
                egui::Button::new(statics::EN_BTN_CREATE_FOR_SELECTED),
            )
            .clicked()
        {
            self.submit_metadata_create();
        }
        if self.meta_busy {
            ui.spinner();
        }

        ui.separator();
        ui.strong(statics::EN_HEADING_UNASSIGNED);
        if unassigned.is_empty() {
            ui.label(statics::EN_EMPTY_LIST);
            return;
        }
        egui::ScrollArea::vertical()
            .id_salt("unassigned_list")
            .show(ui, |ui| {
                for empire in unassigned {
                    let mut checked = self.meta_selected.contains(&empire.object_id);
                    ui.horizontal(|ui| {
                        if ui.checkbox(&mut checked, &empire.empire_name).changed() {
                            if checked {
                                self.meta_selected.push(empire.object_id.clone());
                            } else {
                                self.meta_selected.retain(|id| id != &empire.object_id);
                            }
                        }
                        ui.label(egui::RichText::new(&empire.object_id).monospace().small());
                    });
                }
            });
    }

    fn render_metadata_manage(&mut self, ui: &mut egui::Ui, assigned: &[Empire]) {
        ui.strong(statics::EN_HEADING_MANAGE_METADATA);
        if assigned.is_empty() {
            ui.label(statics::EN_EMPTY_LIST);
            return;
        }

        enum RowAction {
            Open(usize),
            Delete(usize),
        }
        let mut action: Option<RowAction> = None;

        egui::ScrollArea::vertical()
            .id_salt("assigned_list")
            .show(ui, |ui| {
                for (idx, empire) in assigned.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(&empire.empire_name);
                        ui.label(egui::RichText::new(&empire.object_id).monospace().small());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button(statics::EN_BTN_DELETE).clicked() {
                                action = Some(RowAction::Delete(idx));
                            }
                            if ui.small_button(statics::EN_BTN_VIEW_EDIT).clicked() {
                                action = Some(RowAction::Open(idx));
                            }
                        });
                    });
                    ui.separator();
                }
            });

        match action {
            Some(RowAction::Open(idx)) => {
                let empire = &assigned[idx];
                self.open_metadata_modal(&empire.object_id, &empire.empire_name);
            }
            Some(RowAction::Delete(idx)) => {
                let object_id = assigned[idx].object_id.clone();
                self.delete_metadata(&object_id);
            }
            None => {}
        }
    }

    fn render_meta_modal(&mut self, ctx: &egui::Context) {
        let Some(mut modal) = self.meta_modal.take() else {
            return;
        };
        let mut open = true;
        let mut cancel = false;
        let mut save = false;
        let mut add_images = false;
        let mut toggle: Option<String> = None;
        let mut unstage: Option<usize> = None;

        egui::Window::new(format!("{} (ID: {})", modal.empire_name, modal.meta_id))
            .collapsible(false)
            .open(&mut open)
            .default_size([720.0, 620.0])
            .show(ctx, |ui| {
                if let Some(err) = &modal.error {
                    ui.colored_label(egui::Color32::RED, err);
                }

                ui.horizontal(|ui| {
                    ui.strong(statics::EN_HEADING_IMAGES);
                    if modal.loading_images > 0 {
                        ui.spinner();
                        ui.label(statics::EN_LOADING);
                    }
                    if ui
                        .add_enabled(
                            !modal.saving,
                            egui::Button::new(statics::EN_BTN_ADD_IMAGES),
                        )
                        .clicked()
                    {
                        add_images = true;
                    }
                });

                egui::ScrollArea::vertical()
                    .id_salt("modal_images")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        ui.horizontal_wrapped(|ui| {
                            // Server images first, then staged additions.
                            for img in &modal.images.existing {
                                let marked = modal.images.is_marked_removed(&img.file_name);
                                ui.vertical(|ui| {
                                    if let Some(tex) =
                                        img.preview.and_then(|id| self.texture_for(id))
                                    {
                                        let mut image = egui::Image::new(&tex)
                                            .fit_to_exact_size(egui::vec2(96.0, 96.0));
                                        if marked {
                                            image = image.tint(egui::Color32::from_gray(80));
                                        }
                                        ui.add(image);
                                    } else {
                                        ui.label(
                                            egui::RichText::new(&img.file_name).small(),
                                        );
                                    }
                                    if marked {
                                        ui.label(
                                            egui::RichText::new(statics::EN_LABEL_REMOVED_BADGE)
                                                .small()
                                                .color(egui::Color32::RED),
                                        );
                                    }
                                    let label = if marked {
                                        statics::EN_BTN_RESET
                                    } else {
                                        statics::EN_BTN_DELETE
                                    };
                                    if ui.small_button(label).clicked() {
                                        toggle = Some(img.file_name.clone());
                                    }
                                });
                            }
                            for (idx, staged) in
                                modal.images.pending_addition.iter().enumerate()
                            {
                                ui.vertical(|ui| {
                                    if let Some(tex) =
                                        staged.preview.and_then(|id| self.texture_for(id))
                                    {
                                        ui.add(
                                            egui::Image::new(&tex)
                                                .fit_to_exact_size(egui::vec2(96.0, 96.0)),
                                        );
                                    } else {
                                        ui.label(
                                            egui::RichText::new(&staged.file_name).small(),
                                        );
                                    }
                                    ui.label(
                                        egui::RichText::new(statics::EN_LABEL_NEW_BADGE)
                                            .small()
                                            .color(egui::Color32::GREEN),
                                    );
                                    if ui.small_button(statics::EN_BTN_DELETE).clicked() {
                                        unstage = Some(idx);
                                    }
                                });
                            }
                        });
                    });

                ui.separator();
                ui.strong(statics::EN_HEADING_DATA_CONTENT);
                egui::ScrollArea::vertical()
                    .id_salt("modal_rows")
                    .max_height(260.0)
                    .show(ui, |ui| {
                        row_editor_ui(ui, &mut modal.rows, "modal_rows_editor");
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button(statics::EN_BTN_CANCEL).clicked() {
                        cancel = true;
                    }
                    // Saving is held off while image detail fetches are
                    // still resolving.
                    let can_save = !modal.saving && modal.loading_images == 0;
                    let save_label = if modal.images.has_changes() {
                        format!(
                            "{} ({})",
                            statics::EN_BTN_SAVE_CHANGES,
                            modal.images.change_count()
                        )
                    } else {
                        statics::EN_BTN_SAVE_CHANGES.to_string()
                    };
                    if ui
                        .add_enabled(can_save, egui::Button::new(save_label))
                        .clicked()
                    {
                        save = true;
                    }
                    if modal.saving {
                        ui.spinner();
                    }
                });
            });

        if add_images {
            Self::stage_picked_images(&mut modal.images, &mut self.registry);
        }
        if let Some(file_name) = toggle {
            modal.images.toggle_removal(&file_name);
        }
        if let Some(idx) = unstage {
            modal.images.unstage_addition(idx, &mut self.registry);
            self.prune_textures();
        }

        if cancel || !open {
            // Abandon the session: outstanding fetches for it are stale now.
            self.epoch += 1;
            self.empires_loading = false;
            self.layers_loading = false;
            modal.images.close(&mut self.registry);
            self.prune_textures();
            return;
        }

        self.meta_modal = Some(modal);
        if save {
            self.submit_metadata_update();
        }
    }

    fn render_confirm(&mut self, ctx: &egui::Context) {
        let Some(target) = self.confirm.clone() else {
            return;
        };
        let message = match &target {
            ConfirmTarget::Empire(_) => statics::EN_CONFIRM_DELETE_EMPIRE,
            ConfirmTarget::Layer(_) => statics::EN_CONFIRM_DELETE_LAYER,
        };
        let mut open = true;
        let mut decided = false;
        egui::Window::new(statics::EN_BTN_DELETE)
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(message);
                ui.horizontal(|ui| {
                    if ui.button(statics::EN_BTN_CANCEL).clicked() {
                        decided = true;
                    }
                    if ui.button(statics::EN_BTN_CONFIRM_DELETE).clicked() {
                        decided = true;
                        match &target {
                            ConfirmTarget::Empire(object_id) => {
                                let object_id = object_id.clone();
                                self.spawn(move |api| {
                                    NetEvent::EmpireDeleted(api.delete_empire(&object_id))
                                });
                            }
                            ConfirmTarget::Layer(id) => {
                                let id = id.clone();
                                self.spawn(move |api| {
                                    NetEvent::LayerDeleted(api.delete_layer(&id))
                                });
                            }
                        }
                    }
                });
            });
        if decided || !open {
            self.confirm = None;
        }
    }
}

fn non_empty(text: &str) -> &str {
    if text.is_empty() { statics::EN_DASH } else { text }
}

/// The shared key/value row editor: one line per attribute, add/remove, both
/// sides editable in place.
fn row_editor_ui(ui: &mut egui::Ui, editor: &mut RowEditor, id_salt: &str) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(statics::EN_HEADING_ATTRIBUTES)
                .small()
                .strong(),
        );
        if ui.small_button(statics::EN_BTN_ADD_ROW).clicked() {
            editor.add_row();
        }
    });

    let mut remove: Option<usize> = None;
    for idx in 0..editor.rows.len() {
        ui.push_id((id_salt, idx), |ui| {
            ui.horizontal(|ui| {
                let mut key = editor.rows[idx].key.clone();
                let key_resp = ui.add(
                    egui::TextEdit::singleline(&mut key)
                        .desired_width(180.0)
                        .hint_text(statics::EN_HINT_COLUMN),
                );
                if key_resp.changed() {
                    editor.edit_row(idx, RowField::Key, &key);
                }
                ui.label(":");
                let mut value = editor.rows[idx].value.clone();
                let value_resp = ui.add(
                    egui::TextEdit::singleline(&mut value)
                        .desired_width(280.0)
                        .hint_text(statics::EN_HINT_VALUE),
                );
                if value_resp.changed() {
                    editor.edit_row(idx, RowField::Value, &value);
                }
                if ui.small_button(statics::EN_GLYPH_REMOVE_ROW).clicked() {
                    remove = Some(idx);
                }
            });
        });
    }
    if let Some(idx) = remove {
        editor.remove_row(idx);
    }
    if editor.rows.is_empty() {
        ui.label(egui::RichText::new(statics::EN_EMPTY_ROWS).italics().weak());
    }
}

impl eframe::App for MapdeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.label(egui::RichText::new(statics::EN_APP_TITLE).strong());
                ui.separator();

                let logged_in = self.session.is_logged_in();
                if logged_in {
                    let mut go_to: Option<Screen> = None;
                    if ui
                        .selectable_label(self.screen == Screen::Empires, statics::EN_TAB_EMPIRES)
                        .clicked()
                    {
                        go_to = Some(Screen::Empires);
                    }
                    if ui
                        .selectable_label(self.screen == Screen::Layers, statics::EN_TAB_LAYERS)
                        .clicked()
                    {
                        go_to = Some(Screen::Layers);
                    }
                    if ui
                        .selectable_label(self.screen == Screen::Metadata, statics::EN_TAB_METADATA)
                        .clicked()
                    {
                        go_to = Some(Screen::Metadata);
                    }
                    if let Some(screen) = go_to {
                        self.switch_screen(screen);
                    }
                    ui.separator();
                }
                if ui.button(statics::EN_BTN_TOGGLE_THEME).clicked() {
                    self.theme_dark = !self.theme_dark;
                    if self.theme_dark {
                        ctx.set_visuals(egui::Visuals::dark());
                    } else {
                        ctx.set_visuals(egui::Visuals::light());
                    }
                }
                if logged_in && ui.button(statics::EN_BTN_LOGOUT).clicked() {
                    self.logout();
                }

                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        if let Some(err) = self.last_error.clone() {
            egui::TopBottomPanel::top("error_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, err);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(statics::EN_BTN_CLEAR).clicked() {
                            self.last_error = None;
                        }
                    });
                });
            });
        }

        if !self.session.is_logged_in() {
            egui::CentralPanel::default().show(ctx, |ui| {
                self.render_login(ui);
            });
            return;
        }

        // First frame after startup with stored credentials: prime the lists.
        if !self.primed {
            self.primed = true;
            self.refresh_empires();
            if self.screen == Screen::Metadata {
                self.refresh_metadata_map();
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Empires => self.render_empires(ui),
            Screen::Layers => self.render_layers(ui),
            Screen::Metadata => self.render_metadata(ui),
        });

        self.render_empire_viewer(ctx);
        self.render_empire_form(ctx);
        self.render_layer_viewer(ctx);
        self.render_layer_form(ctx);
        self.render_meta_modal(ctx);
        self.render_confirm(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_year, pick_era, year_label};
    use crate::api::YearEra;

    #[test]
    fn parse_year_accepts_integers_only() {
        assert_eq!(parse_year(" 322 "), Some(322));
        assert_eq!(parse_year("-50"), Some(-50));
        assert_eq!(parse_year("three"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn pick_era_defaults_unknown_values_to_bce() {
        assert_eq!(pick_era("CE"), "CE");
        assert_eq!(pick_era("BCE"), "BCE");
        assert_eq!(pick_era(""), "BCE");
        assert_eq!(pick_era("AD"), "BCE");
    }

    #[test]
    fn year_label_joins_year_and_era() {
        let y = YearEra {
            year: 322,
            era: "BCE".to_string(),
        };
        assert_eq!(year_label(&y), "322 BCE");
    }
}
