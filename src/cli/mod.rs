//! Interactive menus: the main loop, the composition flows and repository housekeeping.

pub mod reviewer;
pub mod view;

pub use reviewer::TerminalReviewer;

use chrono::Utc;
use dialoguer::{Confirm, Input, Select};
use tracing::{info, warn};

use crate::ai::AiCollaborator;
use crate::apply::ApplyTarget;
use crate::config::Config;
use crate::error::{CliError, GitError};
use crate::git::GitCollaborator;
use crate::git::diff::DiffContext;
use crate::grammar::{CommitMessage, CommitType, Grammar, TypeToken};
use crate::history::{HistoryLog, HistoryRecord};
use crate::i18n::{Language, Msg};
use crate::prompt::{PromptBuilder, PromptHints};
use crate::session::{self, Outcome, Session, SessionOptions};
use crate::suggestion;

/// Number of commits listed before asking for a commit id.
const RECENT_COMMITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    NewCommit,
    AmendLast,
    EditById,
    Repository,
    History,
    FormatRules,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 7] = [
        MenuItem::NewCommit,
        MenuItem::AmendLast,
        MenuItem::EditById,
        MenuItem::Repository,
        MenuItem::History,
        MenuItem::FormatRules,
        MenuItem::Exit,
    ];

    fn msg(self) -> Msg {
        match self {
            MenuItem::NewCommit => Msg::MenuNewCommit,
            MenuItem::AmendLast => Msg::MenuAmendLast,
            MenuItem::EditById => Msg::MenuEditById,
            MenuItem::Repository => Msg::MenuRepository,
            MenuItem::History => Msg::MenuHistory,
            MenuItem::FormatRules => Msg::MenuFormatRules,
            MenuItem::Exit => Msg::MenuExit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepoItem {
    Status,
    StageAll,
    StagePaths,
    UnstagePaths,
    Branches,
    CreateBranch,
    SwitchBranch,
    StashSave,
    StashPop,
    StashList,
    StashApply,
    UndoChanges,
    RevertLast,
    Push,
    Pull,
    Back,
}

impl RepoItem {
    const ALL: [RepoItem; 16] = [
        RepoItem::Status,
        RepoItem::StageAll,
        RepoItem::StagePaths,
        RepoItem::UnstagePaths,
        RepoItem::Branches,
        RepoItem::CreateBranch,
        RepoItem::SwitchBranch,
        RepoItem::StashSave,
        RepoItem::StashPop,
        RepoItem::StashList,
        RepoItem::StashApply,
        RepoItem::UndoChanges,
        RepoItem::RevertLast,
        RepoItem::Push,
        RepoItem::Pull,
        RepoItem::Back,
    ];

    fn msg(self) -> Msg {
        match self {
            RepoItem::Status => Msg::RepoStatus,
            RepoItem::StageAll => Msg::RepoStageAll,
            RepoItem::StagePaths => Msg::RepoStagePaths,
            RepoItem::UnstagePaths => Msg::RepoUnstagePaths,
            RepoItem::Branches => Msg::RepoBranches,
            RepoItem::CreateBranch => Msg::RepoCreateBranch,
            RepoItem::SwitchBranch => Msg::RepoSwitchBranch,
            RepoItem::StashSave => Msg::RepoStashSave,
            RepoItem::StashPop => Msg::RepoStashPop,
            RepoItem::StashList => Msg::RepoStashList,
            RepoItem::StashApply => Msg::RepoStashApply,
            RepoItem::UndoChanges => Msg::RepoUndoChanges,
            RepoItem::RevertLast => Msg::RepoRevertLast,
            RepoItem::Push => Msg::RepoPush,
            RepoItem::Pull => Msg::RepoPull,
            RepoItem::Back => Msg::RepoBack,
        }
    }
}

/// Split a space separated path list typed by the user.
fn split_paths(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Starting draft built from the user's hints, used when no suggestion arrives.
fn seed_from_hints(hints: &PromptHints) -> CommitMessage {
    CommitMessage {
        commit_type: hints.commit_type.map(TypeToken::Known),
        scope: hints.scope.clone(),
        footer: hints.ticket.as_ref().map(|t| format!("Closes: {t}")),
        ..Default::default()
    }
}

fn non_empty(input: String) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The interactive application.
pub struct App<'a> {
    git: &'a dyn GitCollaborator,
    ai: &'a dyn AiCollaborator,
    language: Option<Language>,
    grammar: Grammar,
    prompts: PromptBuilder,
    history: HistoryLog,
}

impl<'a> App<'a> {
    pub fn new(git: &'a dyn GitCollaborator, ai: &'a dyn AiCollaborator, config: &Config) -> Self {
        Self {
            git,
            ai,
            language: config.language,
            grammar: Grammar::new(config.max_subject_len),
            prompts: PromptBuilder::new(config.diff_budget, config.max_subject_len),
            history: HistoryLog::new(config.history_path.clone()),
        }
    }

    /// Main menu loop. Returns when the user exits.
    pub async fn run(&mut self) -> Result<(), CliError> {
        let lang = match self.language {
            Some(lang) => lang,
            None => {
                let lang = choose_language()?;
                self.language = Some(lang);
                lang
            }
        };

        loop {
            let labels: Vec<&str> = MenuItem::ALL.iter().map(|m| lang.tr(m.msg())).collect();
            let idx = Select::new()
                .with_prompt(lang.tr(Msg::MenuTitle))
                .items(&labels)
                .default(0)
                .interact()?;

            let item = MenuItem::ALL[idx];
            let result = match item {
                MenuItem::NewCommit => self.new_commit(lang).await,
                MenuItem::AmendLast => self.edit_last(lang).await,
                MenuItem::EditById => self.edit_by_id(lang).await,
                MenuItem::Repository => self.repository_menu(lang),
                MenuItem::History => self.show_history(lang),
                MenuItem::FormatRules => {
                    println!("\n{}\n", view::format_rules(lang, self.grammar.max_subject_len));
                    Ok(())
                }
                MenuItem::Exit => {
                    println!("{}", lang.tr(Msg::Goodbye));
                    return Ok(());
                }
            };

            match result {
                Ok(()) => {}
                // Terminal failures end the program, everything else returns to the menu
                Err(e @ CliError::Input(_)) => return Err(e),
                Err(e) => eprintln!("{}: {e}", lang.tr(Msg::GitFailed)),
            }
            self.print_command_summary(lang);
        }
    }

    async fn new_commit(&mut self, lang: Language) -> Result<(), CliError> {
        let mut diff = self.git.staged_diff()?;
        if diff.is_empty()
            && Confirm::new()
                .with_prompt(lang.tr(Msg::StageAllPrompt))
                .default(true)
                .interact()?
        {
            self.git.stage_all()?;
            diff = self.git.staged_diff()?;
        }

        let hints = if diff.is_empty() {
            PromptHints::default()
        } else {
            println!(
                "{} file(s), +{} -{}",
                diff.file_count(),
                diff.insertions,
                diff.deletions
            );
            ask_hints(&self.grammar.suggest_types(&diff), lang)?
        };

        let options = SessionOptions {
            seed: seed_from_hints(&hints),
            hints,
            target: ApplyTarget::NewCommit,
            ai_enabled: true,
            ..self.session_options(lang)
        };
        self.compose(options, diff).await
    }

    async fn edit_last(&mut self, lang: Language) -> Result<(), CliError> {
        let id = self.git.resolve_commit("HEAD")?;
        self.edit_existing(&id, ApplyTarget::AmendLast, lang).await
    }

    async fn edit_by_id(&mut self, lang: Language) -> Result<(), CliError> {
        let recent = self.git.recent_commits(RECENT_COMMITS)?;
        if !recent.is_empty() {
            println!("\n{}:", lang.tr(Msg::RecentCommitsTitle));
            for commit in &recent {
                println!("  {commit}");
            }
            println!();
        }

        let id = loop {
            let input: String = Input::new()
                .with_prompt(lang.tr(Msg::CommitIdPrompt))
                .allow_empty(true)
                .interact_text()?;
            let Some(input) = non_empty(input) else {
                println!("{}", lang.tr(Msg::Cancelled));
                return Ok(());
            };
            match self.git.resolve_commit(&input) {
                Ok(id) => break id,
                Err(e @ GitError::CommitNotFound(_)) => eprintln!("{e}"),
                Err(e) => return Err(e.into()),
            }
        };

        self.edit_existing(&id, ApplyTarget::RebaseEdit(id.clone()), lang)
            .await
    }

    /// Reword an existing commit, seeding the session with its current message.
    async fn edit_existing(
        &mut self,
        id: &str,
        target: ApplyTarget,
        lang: Language,
    ) -> Result<(), CliError> {
        let current = self.git.commit_message(id)?;
        println!("\n{}:", lang.tr(Msg::CurrentMessageTitle));
        for line in current.trim_end().lines() {
            println!("  {line}");
        }
        println!();

        let modes = [lang.tr(Msg::EditModeAi), lang.tr(Msg::EditModeManual)];
        let mode = Select::new()
            .with_prompt(lang.tr(Msg::EditModePrompt))
            .items(&modes)
            .default(0)
            .interact()?;

        let diff = self.git.commit_diff(id)?;
        let options = SessionOptions {
            seed: suggestion::draft_from_text(&current),
            target,
            ai_enabled: mode == 0,
            ..self.session_options(lang)
        };
        self.compose(options, diff).await
    }

    fn session_options(&self, lang: Language) -> SessionOptions {
        SessionOptions {
            language: lang,
            grammar: self.grammar,
            prompts: self.prompts,
            ..Default::default()
        }
    }

    /// Run one composition session to its end and record it.
    async fn compose(&mut self, options: SessionOptions, diff: DiffContext) -> Result<(), CliError> {
        let lang = options.language;
        let mut session = Session::new(options);
        let mut reviewer = TerminalReviewer::new();
        session::run(&mut session, diff, self.ai, self.git, &mut reviewer).await?;

        match session.outcome() {
            Some(Outcome::Finalized {
                message, commit_id, ..
            }) => {
                println!("\n{}", lang.tr(Msg::Committed));
                println!("  {} {}", short_id(&commit_id), message.header());
            }
            Some(Outcome::Cancelled) | None => println!("{}", lang.tr(Msg::Cancelled)),
        }

        if let Some(record) = HistoryRecord::from_session(&session, Utc::now()) {
            // A broken history file must not cost the user a finished commit
            if let Err(e) = self.history.append(&record) {
                warn!("Could not record session history: {e}");
            }
        }
        Ok(())
    }

    fn repository_menu(&mut self, lang: Language) -> Result<(), CliError> {
        loop {
            let labels: Vec<&str> = RepoItem::ALL.iter().map(|r| lang.tr(r.msg())).collect();
            let idx = Select::new()
                .with_prompt(lang.tr(Msg::RepoTitle))
                .items(&labels)
                .default(0)
                .interact()?;

            let item = RepoItem::ALL[idx];
            if item == RepoItem::Back {
                return Ok(());
            }
            info!(action = ?item, "Repository action");

            // git failures are shown and the submenu stays open
            match self.repository_action(item, lang) {
                Ok(()) => {}
                Err(CliError::Git(e)) => eprintln!("{}: {e}", lang.tr(Msg::GitFailed)),
                Err(e) => return Err(e),
            }
            self.print_command_summary(lang);
        }
    }

    fn repository_action(&self, item: RepoItem, lang: Language) -> Result<(), CliError> {
        let git = self.git;
        match item {
            RepoItem::Status => println!("{}", git.status()?),
            RepoItem::StageAll => {
                git.stage_all()?;
                println!("{}", lang.tr(Msg::Done));
            }
            RepoItem::StagePaths | RepoItem::UnstagePaths => {
                let paths = split_paths(&prompt_text(lang.tr(Msg::PathsPrompt))?);
                if paths.is_empty() {
                    return Ok(());
                }
                if item == RepoItem::StagePaths {
                    git.stage_paths(&paths)?;
                } else {
                    git.unstage_paths(&paths)?;
                }
                println!("{}", lang.tr(Msg::Done));
            }
            RepoItem::Branches => {
                for branch in git.branches()? {
                    let marker = if branch.is_head { "*" } else { " " };
                    println!("{marker} {}", branch.name);
                }
            }
            RepoItem::CreateBranch | RepoItem::SwitchBranch => {
                let Some(name) = non_empty(prompt_text(lang.tr(Msg::BranchNamePrompt))?) else {
                    return Ok(());
                };
                if item == RepoItem::CreateBranch {
                    git.create_branch(&name)?;
                } else {
                    git.switch_branch(&name)?;
                }
                println!("{}", lang.tr(Msg::Done));
            }
            RepoItem::StashSave => {
                let message = non_empty(prompt_text(lang.tr(Msg::StashMessagePrompt))?);
                git.stash_save(message)?;
                println!("{}", lang.tr(Msg::Done));
            }
            RepoItem::StashPop => {
                git.stash_pop()?;
                println!("{}", lang.tr(Msg::Done));
            }
            RepoItem::StashList => {
                for entry in git.stash_list()? {
                    println!("  {entry}");
                }
            }
            RepoItem::StashApply => {
                for entry in git.stash_list()? {
                    println!("  {entry}");
                }
                let stash = non_empty(prompt_text(lang.tr(Msg::StashIdPrompt))?);
                git.stash_apply(stash)?;
                println!("{}", lang.tr(Msg::Done));
            }
            RepoItem::UndoChanges => {
                let paths = split_paths(&prompt_text(lang.tr(Msg::UndoPathsPrompt))?);
                if confirm(lang.tr(Msg::UndoConfirm))? {
                    git.discard_changes(&paths)?;
                    println!("{}", lang.tr(Msg::Done));
                }
            }
            RepoItem::RevertLast => {
                if confirm(lang.tr(Msg::RevertConfirm))? {
                    let id = git.revert_last_commit()?;
                    println!("{} {}", lang.tr(Msg::Done), short_id(&id));
                }
            }
            RepoItem::Push => {
                let branch = non_empty(prompt_text(lang.tr(Msg::PushBranchPrompt))?);
                println!("{}", git.push(branch)?);
            }
            RepoItem::Pull => println!("{}", git.pull()?),
            RepoItem::Back => {}
        }
        Ok(())
    }

    fn show_history(&self, lang: Language) -> Result<(), CliError> {
        let summary = self.history.summarize()?;
        println!("\n{}\n", view::history_text(&summary, lang));
        Ok(())
    }

    fn print_command_summary(&self, lang: Language) {
        if let Some(summary) = view::command_summary(&self.git.take_command_log(), lang) {
            println!("\n{summary}\n");
        }
    }
}

fn choose_language() -> Result<Language, CliError> {
    let labels: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();
    let idx = Select::new()
        .with_prompt(Language::En.tr(Msg::LanguagePrompt))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Language::ALL[idx])
}

/// Type, scope and ticket the user wants the suggestion to use.
fn ask_hints(suggested: &[CommitType], lang: Language) -> Result<PromptHints, CliError> {
    let mut labels = vec![lang.tr(Msg::LetAiDecide).to_string()];
    labels.extend(
        CommitType::ALL
            .iter()
            .map(|t| view::type_choice(*t, suggested, lang)),
    );

    let idx = Select::new()
        .with_prompt(lang.tr(Msg::TypeHintPrompt))
        .items(&labels)
        .default(0)
        .interact()?;
    let commit_type = idx.checked_sub(1).map(|i| CommitType::ALL[i]);

    Ok(PromptHints {
        commit_type,
        scope: non_empty(prompt_text(lang.tr(Msg::ScopePrompt))?),
        ticket: non_empty(prompt_text(lang.tr(Msg::TicketPrompt))?),
        extra: Vec::new(),
    })
}

/// Yes/no question for destructive actions, defaulting to no.
fn confirm(prompt: &str) -> Result<bool, CliError> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn prompt_text(prompt: &str) -> Result<String, CliError> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

fn short_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}
