//! Transformer catalog
//!
//! One entry per supported `event_type`. The macro keeps the string key, the
//! enum variant and the transformer function in a single table so the three
//! views cannot drift apart.

use crate::transformers::{self, Transformer};

macro_rules! catalog {
    ($( $variant:ident => $event_type:literal, $module:ident :: $func:ident; )+) => {
        /// Every event type with a registered transformer
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventKind {
            $( $variant, )+
        }

        impl EventKind {
            /// The full catalog, in registration order
            pub const ALL: &'static [EventKind] = &[ $( EventKind::$variant, )+ ];

            /// The raw `event_type` string this kind is keyed on
            pub fn event_type(self) -> &'static str {
                match self {
                    $( EventKind::$variant => $event_type, )+
                }
            }

            /// Look a kind up by its raw `event_type`
            pub fn from_event_type(event_type: &str) -> Option<EventKind> {
                match event_type {
                    $( $event_type => Some(EventKind::$variant), )+
                    _ => None,
                }
            }

            /// The transformer completing the envelope for this kind
            pub fn transformer(self) -> Transformer {
                match self {
                    $( EventKind::$variant => transformers::$module::$func, )+
                }
            }
        }
    };
}

catalog! {
    BookmarkAdded => "edx.bookmark.added", bookmark::added;
    BookmarkListed => "edx.bookmark.listed", bookmark::listed;
    BookmarkAccessed => "edx.bookmark.accessed", bookmark::accessed;
    BookmarkRemoved => "edx.bookmark.removed", bookmark::removed;
    LinkClicked => "edx.ui.lms.link_clicked", navigation::link_clicked;
    EnrollmentActivated => "edx.course.enrollment.activated", enrollment::activated;
    EnrollmentDeactivated => "edx.course.enrollment.deactivated", enrollment::deactivated;
    EnrollmentModeChanged => "edx.course.enrollment.mode_changed", enrollment::mode_changed;
    EnrollmentUpgradeClicked => "edx.course.enrollment.upgrade.clicked", enrollment::upgrade_clicked;
    VideoSpeedChanged => "speed_change_video", video::speed_changed;
    CourseToolAccessed => "edx.course.tool.accessed", navigation::tool_accessed;
    ForumResponseCreated => "edx.forum.response.created", forum::response_created;
    ProblemShow => "problem_show", problem::show;
    SequenceNextSelected => "edx.ui.lms.sequence.next_selected", navigation::sequence_next_selected;
    SequencePreviousSelected => "edx.ui.lms.sequence.previous_selected", navigation::sequence_previous_selected;
    SeqNext => "seq_next", navigation::seq_next;
    SeqPrev => "seq_prev", navigation::seq_prev;
    VideoStopped => "stop_video", video::stop;
    ProblemGraded => "problem_graded", problem::graded;
    ProblemSaveClicked => "problem_save", problem::save_clicked;
    GradesProblemSubmitted => "edx.grades.problem.submitted", problem::grades_submitted;
    DemandHintDisplayed => "edx.problem.hint.demandhint_displayed", problem::demand_hint_displayed;
    HintFeedbackDisplayed => "edx.problem.hint.feedback_displayed", problem::feedback_displayed;
    VideoPaused => "pause_video", video::pause;
    VideoSeeked => "seek_video", video::seek;
    VideoLoaded => "load_video", video::load;
    TranscriptShown => "show_transcript", video::transcript_shown;
    CaptionsShown => "edx.video.closed_captions.shown", video::captions_shown;
    CaptionsHidden => "edx.video.closed_captions.hidden", video::captions_hidden;
    CcMenuShown => "video_show_cc_menu", video::cc_menu_shown;
    ProblemResetClicked => "problem_reset", problem::reset_clicked;
    SeqGoto => "seq_goto", navigation::seq_goto;
    ProblemRescore => "problem_rescore", problem::rescore;
    ForumThreadViewed => "edx.forum.thread.viewed", forum::thread_viewed;
    ProblemSaveSucceeded => "save_problem_success", problem::save_succeeded;
    VideoPlayed => "play_video", video::play;
    TranscriptHidden => "hide_transcript", video::transcript_hidden;
    CcMenuHidden => "video_hide_cc_menu", video::cc_menu_hidden;
    ForumThreadCreated => "edx.forum.thread.created", forum::thread_created;
    PeerSubmissionRetrieved => "openassessmentblock.get_peer_submission", open_response::peer_submission_retrieved;
    PeerAssessed => "openassessmentblock.peer_assess", open_response::peer_assessed;
    NotesViewed => "edx.course.student_notes.viewed", notes::viewed;
    TextbookPageNavigated => "textbook.pdf.page.navigated", textbook::page_navigated;
    ForumCommentCreated => "edx.forum.comment.created", forum::comment_created;
    PollResultsViewed => "xblock.poll.view_results", xblock::poll_results_viewed;
    SurveyResultsViewed => "xblock.survey.view_results", xblock::survey_results_viewed;
    TrainingExampleAssessed => "openassessment.student_training_assess_example", open_response::training_example_assessed;
    SurveySubmitted => "xblock.survey.submitted", xblock::survey_submitted;
    ProblemCheck => "problem_check", problem::check;
    SubmissionCreated => "openassessmentblock.create_submission", open_response::submission_created;
    PollSubmitted => "xblock.poll.submitted", xblock::poll_submitted;
    NotesDeleted => "edx.course.student_notes.deleted", notes::deleted;
    NotesEdited => "edx.course.student_notes.edited", notes::edited;
    NotesAdded => "edx.course.student_notes.added", notes::added;
    StaffGradingSubmissionRetrieved => "openassessmentblock.get_submission_for_staff_grading", open_response::staff_grading_submission_retrieved;
    TextbookPageScrolled => "textbook.pdf.page.scrolled", textbook::page_scrolled;
    TextbookZoomMenuChanged => "textbook.pdf.zoom.menu.changed", textbook::zoom_menu_changed;
    TextbookThumbnailNavigated => "textbook.pdf.thumbnail.navigated", textbook::thumbnail_navigated;
    TextbookZoomButtonsChanged => "textbook.pdf.zoom.buttons.changed", textbook::zoom_buttons_changed;
    Book => "book", textbook::book;
    EnrollmentUpgradeSucceeded => "edx.course.enrollment.upgrade.succeeded", enrollment::upgrade_succeeded;
    NotesPageViewed => "edx.course.student_notes.notes_page_viewed", notes::notes_page_viewed;
    CohortUserAdded => "edx.cohort.user_added", cohort::user_added;
    ForumThreadVoted => "edx.forum.thread.voted", forum::thread_voted;
    ForumResponseVoted => "edx.forum.response.voted", forum::response_voted;
    AssessmentFeedbackSubmitted => "openassessmentblock.submit_feedback_on_assessments", open_response::feedback_submitted;
    SubmissionSaved => "openassessmentblock.save_submission", open_response::submission_saved;
    GoogleDocumentDisplayed => "edx.googlecomponent.document.displayed", third_party::document_displayed;
    GoogleCalendarDisplayed => "edx.googlecomponent.calendar.displayed", third_party::calendar_displayed;
    StaffAssessed => "openassessmentblock.staff_assess", open_response::staff_assessed;
    ForumSearched => "edx.forum.searched", forum::searched;
    OppiaStateChanged => "oppia.exploration.state.changed", third_party::exploration_state_changed;
    TextbookSearchExecuted => "textbook.pdf.search.executed", textbook::search_executed;
    SelfAssessed => "openassessmentblock.self_assess", open_response::self_assessed;
    DragAndDropItemDropped => "edx.drag_and_drop_v2.item.dropped", drag_and_drop::item_dropped;
    DragAndDropItemPickedUp => "edx.drag_and_drop_v2.item.picked_up", drag_and_drop::item_picked_up;
    OppiaLoaded => "oppia.exploration.loaded", third_party::exploration_loaded;
    PeerInstructionOriginalSubmitted => "ubc.peer_instruction.original_submitted", peer_instruction::original_submitted;
    PeerInstructionRevisedSubmitted => "ubc.peer_instruction.revised_submitted", peer_instruction::revised_submitted;
    DragAndDropLoaded => "edx.drag_and_drop_v2.loaded", drag_and_drop::loaded;
    TeamChanged => "edx.team.changed", team::changed;
    ResumeCourseClicked => "edx.course.home.resume_course.clicked", course::resume_course_clicked;
    TimedAttemptCreated => "edx.special_exam.timed.attempt.created", exam::timed_attempt_created;
    TimedAttemptStarted => "edx.special_exam.timed.attempt.started", exam::timed_attempt_started;
    NotesUsedUnitLink => "edx.course.student_notes.used_unit_link", notes::used_unit_link;
    TimedAttemptSubmitted => "edx.special_exam.timed.attempt.submitted", exam::timed_attempt_submitted;
    DragAndDropFeedbackOpened => "edx.drag_and_drop_v2.feedback.opened", drag_and_drop::feedback_opened;
    DragAndDropFeedbackClosed => "edx.drag_and_drop_v2.feedback.closed", drag_and_drop::feedback_closed;
    TimedAttemptReadyToSubmit => "edx.special_exam.timed.attempt.ready_to_submit", exam::timed_attempt_ready_to_submit;
    CohortCreated => "edx.cohort.created", cohort::created;
    PracticeAttemptCreated => "edx.special_exam.practice.attempt.created", exam::practice_attempt_created;
    CohortUserRemoved => "edx.cohort.user_removed", cohort::user_removed;
    TeamPageViewed => "edx.team.page_viewed", team::page_viewed;
    GradesStateDeleted => "edx.grades.problem.state_deleted", problem::state_deleted;
    GradesRescored => "edx.grades.problem.rescored", problem::grades_rescored;
    ProblemResetFailed => "reset_problem_fail", problem::reset_failed;
    ScoreOverridden => "edx.grades.problem.score_overridden", problem::score_overridden;
    TeamLearnerAdded => "edx.team.learner_added", team::learner_added;
    ProblemReset => "reset_problem", problem::reset;
    AnswerShown => "showanswer", problem::answer_shown;
    TimedAttemptDeleted => "edx.special_exam.timed.attempt.deleted", exam::timed_attempt_deleted;
    TextbookOutlineToggled => "textbook.pdf.outline.toggled", textbook::outline_toggled;
    OppiaCompleted => "oppia.exploration.completed", third_party::exploration_completed;
    TeamSearched => "edx.team.searched", team::searched;
    TextbookSearchHighlightToggled => "textbook.pdf.search.highlight.toggled", textbook::search_highlight_toggled;
    TextbookSearchCaseSensitivityToggled => "textbook.pdf.searchcasesensitivity.toggled", textbook::search_case_sensitivity_toggled;
    NotesSearched => "edx.course.student_notes.searched", notes::searched;
    UserSettingsViewed => "edx.user.settings.viewed", user_settings::viewed;
    TextbookThumbnailsToggled => "textbook.pdf.thumbnails.toggled", textbook::thumbnails_toggled;
    TeamDeleted => "edx.team.deleted", team::deleted;
    TeamCreated => "edx.team.created", team::created;
    PeerInstructionAccessed => "ubc.peer_instruction.accessed", peer_instruction::accessed;
    ProblemCheckFailed => "problem_check_fail", problem::check_failed;
    TextbookDisplayScaled => "textbook.pdf.display.scaled", textbook::display_scaled;
    TextbookChapterNavigated => "textbook.pdf.chapter.navigated", textbook::chapter_navigated;
    TextbookSearchNavigatedNext => "textbook.pdf.search.navigatednext", textbook::search_navigated_next;
    CertificateCreated => "edx.certificate.created", certificate::created;
    LibraryContentRemoved => "edx.librarycontentblock.content.removed", library::content_removed;
    UserSettingsChanged => "edx.user.settings.changed", user_settings::changed;
    PartitionAssigned => "xmodule.partitions.assigned_user_to_partition", partition::assigned_user_to_partition;
    FileDescriptionsSaved => "openassessmentblock.save_files_descriptions", open_response::file_descriptions_saved;
    SplitTestChildRendered => "xblock.split_test.child_render", xblock::split_test_child_rendered;
    LibraryContentAssigned => "edx.librarycontentblock.content.assigned", library::content_assigned;
    UpgradeSidebarDisplayed => "edx.bi.course.upgrade.sidebarupsell.displayed", user_settings::upgrade_sidebar_displayed;
    ProblemSaveFailed => "save_problem_fail", problem::save_failed;
    TeamLearnerRemoved => "edx.team.learner_removed", team::learner_removed;
    TeamActivityUpdated => "edx.team.activity_updated", team::activity_updated;
    ProctoredCreated => "edx.special_exam.proctored.created", exam::proctored_created;
    PracticeCreated => "edx.special_exam.practice.created", exam::practice_created;
    DoneToggled => "edx.done.toggled", completion::done_toggled;
    PracticeUpdated => "edx.special_exam.practice.updated", exam::practice_updated;
    TimedUpdated => "edx.special_exam.timed.updated", exam::timed_updated;
    ProctoredUpdated => "edx.special_exam.proctored.updated", exam::proctored_updated;
    TimedCreated => "edx.special_exam.timed.created", exam::timed_created;
    GradingPolicyChanged => "edx.grades.grading_policy_changed", course::grading_policy_changed;
    PageClose => "page_close", navigation::page_close;
    CertificateEvidenceVisited => "edx.certificate.evidence_visited", certificate::evidence_visited;
    CertificateShared => "edx.certificate.shared", certificate::shared;
    CohortCreationRequested => "edx.cohort.creation_requested", cohort::creation_requested;
    CohortUserAddRequested => "edx.cohort.user_add_requested", cohort::user_add_requested;
    UserLogin => "edx.user.login", session::login;
    UserLogout => "edx.user.logout", session::logout;
    DiscoverySearchInitiated => "edx.course_discovery.search.initiated", course_discovery::search_initiated;
    DiscoverySearchResultsDisplayed => "edx.course_discovery.search.results_displayed", course_discovery::search_results_displayed;
}

/// The transformer registered for a raw `event_type`, if any
pub fn transformer_for(event_type: &str) -> Option<Transformer> {
    EventKind::from_event_type(event_type).map(EventKind::transformer)
}
