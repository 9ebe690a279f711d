mod buttons;
mod status_bar;

pub use buttons::draw_buttons;
pub use status_bar::draw_status_bar;
