//! Status and toast strings emitted by the core, in the panel's two locales.

use shared::settings::Language;

pub struct Strings {
    pub connecting: &'static str,
    pub connected_as: &'static str,
    pub not_connected: &'static str,
    pub connect_prompt: &'static str,
    pub error: &'static str,
    pub app_not_installed: &'static str,
    pub app_not_running: &'static str,
    pub launching: &'static str,
    pub open_app: &'static str,
    pub joined: &'static str,
    pub left: &'static str,
    pub the_call: &'static str,
    pub sync_complete: &'static str,
    pub members_in_channel: &'static str,
}

static EN: Strings = Strings {
    connecting: "Connecting...",
    connected_as: "Connected as",
    not_connected: "Not connected",
    connect_prompt: "Connect to Discord",
    error: "Something went wrong",
    app_not_installed: "Discord is not installed",
    app_not_running: "Discord is not running",
    launching: "Launching Discord...",
    open_app: "Discord is open, connect when ready",
    joined: "joined",
    left: "left",
    the_call: "the call",
    sync_complete: "Sync complete",
    members_in_channel: "members in channel",
};

static PT: Strings = Strings {
    connecting: "Conectando...",
    connected_as: "Conectado como",
    not_connected: "Desconectado",
    connect_prompt: "Conectar ao Discord",
    error: "Algo deu errado",
    app_not_installed: "Discord não está instalado",
    app_not_running: "Discord não está aberto",
    launching: "Abrindo o Discord...",
    open_app: "Discord aberto, conecte quando quiser",
    joined: "entrou em",
    left: "saiu de",
    the_call: "chamada",
    sync_complete: "Sincronizado",
    members_in_channel: "membros no canal",
};

pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::En => &EN,
        Language::Pt => &PT,
    }
}
