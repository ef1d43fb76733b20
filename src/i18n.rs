//! Session language and the user-facing message table.
//!
//! Business logic never branches on [`Language`]; it only selects text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language for prompts, generated messages and terminal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
        }
    }

    pub fn tr(self, msg: Msg) -> &'static str {
        msg.text(self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "es" | "spanish" | "español" | "espanol" => Ok(Language::Es),
            _ => Err(format!("Unknown language '{}': expected 'en' or 'es'", s)),
        }
    }
}

/// Keys for terminal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    LanguagePrompt,
    MenuTitle,
    MenuNewCommit,
    MenuAmendLast,
    MenuEditById,
    MenuRepository,
    MenuHistory,
    MenuFormatRules,
    MenuExit,
    Goodbye,
    StageAllPrompt,
    TypeHintPrompt,
    LetAiDecide,
    Suggested,
    ScopePrompt,
    TicketPrompt,
    Generating,
    ReviewTitle,
    EditingTitle,
    RawSuggestionTitle,
    TargetLabel,
    ActionPrompt,
    ActionAccept,
    ActionEditField,
    ActionEditText,
    ActionRegenerate,
    ActionRetarget,
    ActionCancel,
    FieldPrompt,
    TypePrompt,
    BreakingPrompt,
    SubjectPrompt,
    BodyPrompt,
    FooterPrompt,
    RegenerateHintPrompt,
    CommitIdPrompt,
    NoticeNoChanges,
    NoticeManual,
    NoticeSuggestionFailed,
    NoticeSuggestionUnusable,
    NoticeSuggestionInvalid,
    NoticeApplyFailed,
    ViolationsTitle,
    Committed,
    Cancelled,
    CurrentMessageTitle,
    EditModePrompt,
    EditModeAi,
    EditModeManual,
    RecentCommitsTitle,
    RepoTitle,
    RepoStatus,
    RepoStageAll,
    RepoStagePaths,
    RepoUnstagePaths,
    RepoBranches,
    RepoCreateBranch,
    RepoSwitchBranch,
    RepoStashSave,
    RepoStashPop,
    RepoStashList,
    RepoStashApply,
    RepoUndoChanges,
    RepoRevertLast,
    RepoPush,
    RepoPull,
    RepoBack,
    PathsPrompt,
    BranchNamePrompt,
    StashMessagePrompt,
    StashIdPrompt,
    UndoPathsPrompt,
    UndoConfirm,
    RevertConfirm,
    PushBranchPrompt,
    Done,
    HistoryTitle,
    HistoryEmpty,
    HistoryFinalized,
    HistoryCancelled,
    HistoryByType,
    HistoryLast,
    CommandSummaryTitle,
    CommandSummaryHint,
    GitFailed,
}

impl Msg {
    pub fn text(self, lang: Language) -> &'static str {
        let (en, es) = match self {
            Msg::LanguagePrompt => ("Choose language", "Elige idioma"),
            Msg::MenuTitle => ("Main menu", "Menú principal"),
            Msg::MenuNewCommit => ("Create a new commit", "Crear un nuevo commit"),
            Msg::MenuAmendLast => ("Edit last commit", "Editar el último commit"),
            Msg::MenuEditById => ("Edit commit by id", "Editar commit por ID"),
            Msg::MenuRepository => ("Repository management", "Gestión del repositorio"),
            Msg::MenuHistory => ("History and summary", "Historial y resumen"),
            Msg::MenuFormatRules => ("Commit format rules", "Reglas de formato de commit"),
            Msg::MenuExit => ("Exit", "Salir"),
            Msg::Goodbye => ("Goodbye!", "¡Hasta luego!"),
            Msg::StageAllPrompt => (
                "Stage all changes before composing?",
                "¿Añadir todos los cambios al staging antes de redactar?",
            ),
            Msg::TypeHintPrompt => (
                "Select the type of change that you're committing",
                "Selecciona el tipo de cambio que estás confirmando",
            ),
            Msg::LetAiDecide => ("Let the AI decide", "Dejar que la IA decida"),
            Msg::Suggested => ("suggested", "sugerido"),
            Msg::ScopePrompt => (
                "Denote the SCOPE of this change (optional)",
                "Indica el ÁMBITO de este cambio (opcional)",
            ),
            Msg::TicketPrompt => (
                "Issue or ticket closed by this change (optional), e.g. #31",
                "Issue o ticket cerrado por este cambio (opcional), ej.: #31",
            ),
            Msg::Generating => (
                "Generating commit message...",
                "Generando mensaje de commit...",
            ),
            Msg::ReviewTitle => ("Commit message", "Mensaje de commit"),
            Msg::EditingTitle => (
                "The message needs changes before it can be applied",
                "El mensaje necesita cambios antes de aplicarse",
            ),
            Msg::RawSuggestionTitle => (
                "AI suggestion (for reference)",
                "Sugerencia de la IA (como referencia)",
            ),
            Msg::TargetLabel => ("Target", "Destino"),
            Msg::ActionPrompt => ("What do you want to do?", "¿Qué quieres hacer?"),
            Msg::ActionAccept => ("Accept and apply", "Aceptar y aplicar"),
            Msg::ActionEditField => ("Edit a field", "Editar un campo"),
            Msg::ActionEditText => (
                "Edit the whole message in your editor",
                "Editar el mensaje completo en tu editor",
            ),
            Msg::ActionRegenerate => ("Regenerate with AI", "Regenerar con IA"),
            Msg::ActionRetarget => ("Change the commit id", "Cambiar el ID del commit"),
            Msg::ActionCancel => ("Cancel", "Cancelar"),
            Msg::FieldPrompt => ("Which field?", "¿Qué campo?"),
            Msg::TypePrompt => ("Type of change", "Tipo de cambio"),
            Msg::BreakingPrompt => (
                "Is this a BREAKING change?",
                "¿Es un cambio DISRUPTIVO?",
            ),
            Msg::SubjectPrompt => (
                "Write a SHORT, IMPERATIVE tense description of the change",
                "Escribe una descripción CORTA e IMPERATIVA del cambio",
            ),
            Msg::BodyPrompt => (
                "Provide a LONGER description (optional). Your editor opens with the current text",
                "Proporciona una descripción MÁS LARGA (opcional). Tu editor se abre con el texto actual",
            ),
            Msg::FooterPrompt => (
                "Footer trailers (optional), e.g. Closes: #31. One per line in the editor",
                "Trailers del pie (opcional), ej.: Closes: #31. Uno por línea en el editor",
            ),
            Msg::RegenerateHintPrompt => (
                "Hint for the new suggestion (optional, e.g. shorter)",
                "Pista para la nueva sugerencia (opcional, ej.: más corto)",
            ),
            Msg::CommitIdPrompt => ("Enter commit ID", "Ingresa el ID del commit"),
            Msg::NoticeNoChanges => (
                "No staged changes: write the message manually",
                "No hay cambios preparados: escribe el mensaje manualmente",
            ),
            Msg::NoticeManual => ("Manual editing", "Edición manual"),
            Msg::NoticeSuggestionFailed => (
                "The AI request failed; continue manually or regenerate",
                "La solicitud a la IA falló; continúa manualmente o regenera",
            ),
            Msg::NoticeSuggestionUnusable => (
                "The AI suggestion could not be parsed; fill in the fields",
                "No se pudo interpretar la sugerencia de la IA; completa los campos",
            ),
            Msg::NoticeSuggestionInvalid => (
                "The AI suggestion breaks some rules",
                "La sugerencia de la IA incumple algunas reglas",
            ),
            Msg::NoticeApplyFailed => (
                "The commit could not be applied; your message was kept",
                "No se pudo aplicar el commit; tu mensaje se conservó",
            ),
            Msg::ViolationsTitle => ("Problems to fix", "Problemas por corregir"),
            Msg::Committed => (
                "Commit message applied successfully!",
                "¡Mensaje de commit aplicado correctamente!",
            ),
            Msg::Cancelled => ("Operation cancelled.", "Operación cancelada."),
            Msg::CurrentMessageTitle => ("Current commit message", "Mensaje actual del commit"),
            Msg::EditModePrompt => ("How do you want to edit it?", "¿Cómo quieres editarlo?"),
            Msg::EditModeAi => ("AI-assisted edit", "Edición asistida por IA"),
            Msg::EditModeManual => ("Manual edit", "Edición manual"),
            Msg::RecentCommitsTitle => (
                "Last commits for reference",
                "Últimos commits como referencia",
            ),
            Msg::RepoTitle => ("Repository management", "Gestión del repositorio"),
            Msg::RepoStatus => ("Repository status", "Estado del repositorio"),
            Msg::RepoStageAll => ("Stage all changes", "Añadir todos los cambios"),
            Msg::RepoStagePaths => ("Stage specific files", "Añadir archivos específicos"),
            Msg::RepoUnstagePaths => ("Unstage files", "Quitar archivos del staging"),
            Msg::RepoBranches => ("List branches", "Listar ramas"),
            Msg::RepoCreateBranch => ("Create and switch to a branch", "Crear y cambiar a una rama"),
            Msg::RepoSwitchBranch => ("Switch branch", "Cambiar de rama"),
            Msg::RepoStashSave => ("Stash changes", "Guardar cambios temporales"),
            Msg::RepoStashPop => ("Pop last stash", "Recuperar el último stash"),
            Msg::RepoStashList => ("List stashes", "Listar stashes"),
            Msg::RepoStashApply => ("Apply a stash", "Aplicar un stash"),
            Msg::RepoUndoChanges => (
                "Discard working tree changes",
                "Descartar cambios del directorio de trabajo",
            ),
            Msg::RepoRevertLast => ("Revert last commit", "Revertir el último commit"),
            Msg::RepoPush => ("Push changes", "Subir cambios"),
            Msg::RepoPull => ("Pull changes", "Descargar cambios"),
            Msg::RepoBack => ("Return to main menu", "Volver al menú principal"),
            Msg::PathsPrompt => (
                "File paths (space separated)",
                "Rutas de archivos (separadas por espacios)",
            ),
            Msg::BranchNamePrompt => ("Branch name", "Nombre de la rama"),
            Msg::StashMessagePrompt => ("Stash message (optional)", "Mensaje del stash (opcional)"),
            Msg::StashIdPrompt => (
                "Stash to apply, e.g. 1 or stash@{1} (empty for the latest)",
                "Stash a aplicar, p. ej. 1 o stash@{1} (vacío para el último)",
            ),
            Msg::UndoPathsPrompt => (
                "Files to discard (space separated, empty for all)",
                "Archivos a descartar (separados por espacios, vacío para todos)",
            ),
            Msg::UndoConfirm => (
                "Unstaged changes will be lost. Continue?",
                "Se perderán los cambios no añadidos. ¿Continuar?",
            ),
            Msg::RevertConfirm => (
                "Create a commit that reverts the last commit?",
                "¿Crear un commit que revierta el último commit?",
            ),
            Msg::PushBranchPrompt => (
                "Branch to push (empty for current branch)",
                "Rama a subir (vacío para la rama actual)",
            ),
            Msg::Done => ("Done.", "Listo."),
            Msg::HistoryTitle => ("Session history", "Historial de sesiones"),
            Msg::HistoryEmpty => ("No sessions recorded yet.", "Aún no hay sesiones registradas."),
            Msg::HistoryFinalized => ("finalized", "finalizadas"),
            Msg::HistoryCancelled => ("cancelled", "canceladas"),
            Msg::HistoryByType => ("By type", "Por tipo"),
            Msg::HistoryLast => ("Last session", "Última sesión"),
            Msg::CommandSummaryTitle => ("Command summary", "Resumen de comandos"),
            Msg::CommandSummaryHint => (
                "You can run these commands directly in your terminal",
                "Puedes ejecutar estos comandos directamente en tu terminal",
            ),
            Msg::GitFailed => ("git error", "error de git"),
        };
        match lang {
            Language::En => en,
            Language::Es => es,
        }
    }
}
