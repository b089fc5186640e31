// Central place for UI strings and other non-localized constants.
// Keep these out of gui.rs to reduce duplication and make tweaks safer.

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_APP_TITLE: &str = "Mapdesk Console";

pub const EN_BTN_LOGIN: &str = "Login";
pub const EN_BTN_LOGOUT: &str = "Logout";
pub const EN_BTN_TOGGLE_THEME: &str = "Theme";
pub const EN_BTN_REFRESH: &str = "Refresh";
pub const EN_BTN_CLEAR: &str = "Clear";
pub const EN_BTN_SEARCH: &str = "Search";
pub const EN_BTN_RESET: &str = "Reset";
pub const EN_BTN_CANCEL: &str = "Cancel";
pub const EN_BTN_VIEW: &str = "View";
pub const EN_BTN_EDIT: &str = "Edit";
pub const EN_BTN_DELETE: &str = "Delete";
pub const EN_BTN_CLOSE: &str = "Close";
pub const EN_BTN_UPLOAD: &str = "Upload";
pub const EN_BTN_UPDATE: &str = "Update";
pub const EN_BTN_NEW_LAYER: &str = "New Layer";
pub const EN_BTN_CHOOSE_FILE: &str = "Choose File...";
pub const EN_BTN_CHOOSE_TXT_FILE: &str = "Choose .txt File...";
pub const EN_BTN_ADD_ROW: &str = "+ Add Custom Row";
pub const EN_BTN_ADD_IMAGES: &str = "Add Images...";
pub const EN_BTN_CREATE_FOR_SELECTED: &str = "Create for Selected";
pub const EN_BTN_SAVE_CHANGES: &str = "Save Changes";
pub const EN_BTN_VIEW_EDIT: &str = "View / Edit";
pub const EN_BTN_CONFIRM_DELETE: &str = "Confirm Delete";

pub const EN_TAB_EMPIRES: &str = "Empires";
pub const EN_TAB_LAYERS: &str = "Layers";
pub const EN_TAB_METADATA: &str = "Metadata";

pub const EN_LOGIN_HEADING: &str = "Mapdesk Login";
pub const EN_HINT_USERNAME: &str = "Username";
pub const EN_HINT_PASSWORD: &str = "Password";
pub const EN_ERR_MISSING_CREDS: &str = "Please enter both username and password.";
pub const EN_ERR_INVALID_CREDS: &str = "Invalid credentials";

pub const EN_HEADING_EMPIRES: &str = "Empire Records";
pub const EN_HEADING_LAYERS: &str = "Geo Layers";
pub const EN_HEADING_NEW_EMPIRE: &str = "Upload New Empire";
pub const EN_HEADING_EDIT_EMPIRE: &str = "Update Empire";
pub const EN_HEADING_NEW_LAYER: &str = "Upload New Layer";
pub const EN_HEADING_EDIT_LAYER: &str = "Update Layer";
pub const EN_HEADING_CREATE_METADATA: &str = "Create New Metadata";
pub const EN_HEADING_UNASSIGNED: &str = "Unassigned Empires";
pub const EN_HEADING_MANAGE_METADATA: &str = "Manage the Metadata";
pub const EN_HEADING_ATTRIBUTES: &str = "Attributes";
pub const EN_HEADING_IMAGES: &str = "Images";
pub const EN_HEADING_DATA_CONTENT: &str = "Data Content";
pub const EN_HEADING_GEO_CONTENT: &str = "GeoJSON Content";
pub const EN_HEADING_LAYER_METADATA: &str = "Metadata";

pub const EN_HINT_FILTER_NAME: &str = "Filter by name";
pub const EN_HINT_FILTER_YEAR: &str = "Filter by year";
pub const EN_HINT_FILTER_LAYER_NAME: &str = "Filter by layer name";
pub const EN_HINT_FILTER_LAYER_TYPE: &str = "Filter by layer type";
pub const EN_HINT_SEARCH_EMPIRES: &str = "Search Empires";
pub const EN_HINT_COLUMN: &str = "Column";
pub const EN_HINT_VALUE: &str = "Value";
pub const EN_HINT_EMPIRE_NAME: &str = "Empire Name";
pub const EN_HINT_LAYER_NAME: &str = "e.g., Yamuna River";
pub const EN_HINT_LAYER_TYPE: &str = "e.g., River, Mountain, City";
pub const EN_HINT_GEO_CONTENT: &str = "Paste raw GeoJSON content here...";
pub const EN_HINT_LAYER_METADATA: &str = "Paste metadata (JSON or plain text) here...";

pub const EN_LABEL_START_YEAR: &str = "Start Year";
pub const EN_LABEL_END_YEAR: &str = "End Year";
pub const EN_LABEL_ALL_ERAS: &str = "All Eras";
pub const EN_LABEL_SELECTED_FILE: &str = "Selected:";
pub const EN_LABEL_METADATA_OPTIONAL: &str = "Metadata (Optional)";
pub const EN_LABEL_SWITCH_TO_MANAGE: &str = "Switch to Manage";
pub const EN_LABEL_SWITCH_TO_CREATE: &str = "Switch to Create";
pub const EN_LABEL_NEW_BADGE: &str = "NEW";
pub const EN_LABEL_REMOVED_BADGE: &str = "marked for removal";

pub const EN_COL_EMPIRE_NAME: &str = "Empire Name";
pub const EN_COL_START_YEAR: &str = "Start Year";
pub const EN_COL_END_YEAR: &str = "End Year";
pub const EN_COL_ID: &str = "ID";
pub const EN_COL_ACTIONS: &str = "Actions";
pub const EN_COL_LAYER_NAME: &str = "Layer Name";
pub const EN_COL_LAYER_TYPE: &str = "Layer Type";
pub const EN_COL_UPDATED: &str = "Updated";

// Small glyphs used in row controls.
pub const EN_GLYPH_REMOVE_ROW: &str = "x";

pub const EN_EMPTY_LIST: &str = "No matching records found.";
pub const EN_EMPTY_ROWS: &str = "No attributes added.";
pub const EN_LOADING: &str = "Loading...";
pub const EN_NO_METADATA: &str = "No metadata available.";
pub const EN_DASH: &str = "\u{2014}";
pub const EN_EMPTY: &str = "";

pub const EN_STATUS_CREATED_METADATA: &str = "Metadata created successfully.";
pub const EN_STATUS_UPDATED_METADATA: &str = "Updated successfully.";
pub const EN_STATUS_DELETED_METADATA: &str = "Successfully deleted";

pub const EN_ERR_FETCH_EMPIRES: &str = "Failed to fetch empires";
pub const EN_ERR_FETCH_LAYERS: &str = "Failed to fetch geo layers";
pub const EN_ERR_FETCH_METADATA: &str = "Failed to fetch data!!";
pub const EN_ERR_VIEW_METADATA: &str = "Failed to view";
pub const EN_ERR_CREATE_METADATA: &str = "Failed to create the metadata";
pub const EN_ERR_UPDATE_METADATA: &str = "Failed to update metadata.";
pub const EN_ERR_DELETE_METADATA: &str = "Failed to delete the metadata!!";
pub const EN_ERR_DELETE_EMPIRE: &str = "Error deleting empire.";
pub const EN_ERR_DELETE_LAYER: &str = "Error deleting geo layer.";
pub const EN_ERR_NO_EMPIRES_SELECTED: &str = "No empires selected!!";
pub const EN_ERR_FILL_ONE_VALUE: &str = "Please fill in at least one value.";
pub const EN_ERR_FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const EN_ERR_FILL_NAME_TYPE: &str = "Please fill in Layer Name and Layer Type";
pub const EN_ERR_GEO_CONTENT_REQUIRED: &str =
    "Please provide GeoJSON content by pasting or uploading a file";
pub const EN_ERR_INVALID_GEOJSON: &str = "Invalid GeoJSON content. Please ensure it's valid JSON.";
pub const EN_ERR_TXT_ONLY: &str = "Please choose a .txt file for metadata.";
pub const EN_ERR_MISSING_META_ID: &str = "Cannot update: Missing Metadata ID";
pub const EN_ERR_META_MAPPING: &str = "Metadata mapping not found.";
pub const EN_ERR_CONNECT: &str = "Error connecting to server. Please try again.";

pub const EN_CONFIRM_DELETE_EMPIRE: &str = "Are you sure you want to delete this empire?";
pub const EN_CONFIRM_DELETE_LAYER: &str = "Are you sure you want to delete this geo layer?";

// Well-known attribute keys pre-populated for new metadata records.
// Never required on save; purely a convenience for data entry.
pub const CANONICAL_FIELDS: &[&str] = &[
    "empireName",
    "Founder",
    "Overall Period",
    "Capital",
    "Famous Kings/Rulers",
    "Architecture",
    "Administration",
    "Art & Culture",
    "Admin Language",
    "Unique Feature",
    "Economy & Trade",
    "Important Battles",
    "Religion",
];

// Remote service surface (API_ prefix). Paths are joined onto the
// externally-configured base URL.
pub const API_SERVICE_PREFIX: &str = "/geo-json-service";

pub const API_VALIDATE_CREDS: &str = "/validate-creds";
pub const API_LIST_EMPIRES: &str = "/get-all-empires";
pub const API_EMPIRE_BY_ID: &str = "/get-empire-details-by-id";
pub const API_CREATE_EMPIRE: &str = "/upload";
pub const API_UPDATE_EMPIRE: &str = "/update";
pub const API_DELETE_EMPIRE: &str = "/delete";
pub const API_LIST_LAYERS: &str = "/get_all_geo_layers";
pub const API_SEARCH_LAYERS: &str = "/search_geo_layers";
pub const API_CREATE_LAYER: &str = "/create_geo_layer";
pub const API_UPDATE_LAYER: &str = "/update_geo_layer";
pub const API_DELETE_LAYER: &str = "/delete_geo_layer";
pub const API_CREATE_METADATA: &str = "/create";
pub const API_UPDATE_METADATA: &str = "/update_empire_metadata";
pub const API_METADATA_MAP: &str = "/get-all-empire-metadata-object-ids";
pub const API_METADATA_BY_ID: &str = "/get_empire_metadata_by_id";
pub const API_DELETE_METADATA: &str = "/delete_empire_metadata";
pub const API_FETCH_IMAGE: &str = "/fetch-image";

// Header identifying this client to the service.
pub const API_CLIENT_HEADER: &str = "client_name";
pub const API_CLIENT_NAME: &str = "MapDesk";

// Multipart field names.
pub const API_FIELD_OBJECT_ID: &str = "objectId";
pub const API_FIELD_IMAGES: &str = "images";
pub const API_FIELD_DETAILS_FILE: &str = "detailsFile";
pub const API_FIELD_NEW_IMAGES: &str = "newImages";
pub const API_FIELD_REMOVE_IMAGE_IDS: &str = "removeImageIds";
pub const API_FIELD_LAYER_NAME: &str = "layerName";
pub const API_FIELD_LAYER_TYPE: &str = "layerType";
pub const API_FIELD_GEO_LAYER_FILE: &str = "geoLayerFile";
pub const API_FIELD_GEO_LAYER_METADATA: &str = "geoLayerMetadata";

// Envelope status values.
pub const API_STATUS_SUCCESS: &str = "success";
pub const API_STATUS_FAILURE: &str = "failure";

// Default file names for content assembled from pasted text.
pub const FILE_DEFAULT_GEO: &str = "layer.geojson";
pub const FILE_DEFAULT_METADATA_TXT: &str = "metadata.txt";
pub const FILE_DEFAULT_DETAILS: &str = "metadata.json";

// Stored credential slot (single JSON file under the user config dir).
pub const CREDS_DIR: &str = "mapdesk";
pub const CREDS_FILE: &str = "creds.json";

// Environment variable naming the service base URL.
pub const ENV_BASE_URL: &str = "MAPDESK_API_BASE_URL";
