pub mod editor_panel;
pub mod help_overlay;
pub mod map_view;
pub mod minimap;
pub mod sidebar;
pub mod toolbar;
