use unicode_normalization::UnicodeNormalization;

use crate::cart::{Cart, CartItem, Product};
use crate::events::{EventKind, HandlerKind, ListenerStore};
use crate::fade::{self, PlaybackFlags, ScrollFade};
use crate::media::{AutoplayPolicy, MediaState, PlaybackStatus};
use crate::page::{DisplayMode, ElementId, OverflowMode, Page};
use crate::scheduler::{FrameAction, PendingTimer, ScheduledTask, Scheduler, TimerAction};
use crate::selector;
use crate::{Error, Result};

const PURCHASE_LABEL: &str = "Add to Cart";
const PURCHASED_LABEL: &str = "Added to Cart!";
const MODAL_ADDED_LABEL: &str = "✓ Added!";
const PURCHASE_RESET_MS: i64 = 2000;
const MODAL_ADD_RESET_MS: i64 = 1500;

const EMPTY_CART_ALERT: &str = "Add some drinks first!";
const CHECKOUT_GENERIC_ALERT: &str = "Thanks for pretending to buy our stuff! 😄\n\nIn real life, this would take you to checkout. But since this is a demo, just know that we appreciate the thought.\n\n(Pro tip: Add your email for fake exclusive deals!)";

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub viewport_height: f64,
    pub section_offset: f64,
    pub autoplay: AutoplayPolicy,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewport_height: 800.0,
            section_offset: 0.0,
            autoplay: AutoplayPolicy::Allow,
        }
    }
}

#[derive(Debug, Clone)]
struct PageRefs {
    body: ElementId,
    intro_video: ElementId,
    logo: ElementId,
    modal: ElementId,
    cart_items: ElementId,
    cart_total: ElementId,
    email_input: ElementId,
    product_videos: Vec<ElementId>,
    modal_videos: Vec<ElementId>,
}

pub struct Harness {
    page: Page,
    refs: PageRefs,
    products: Vec<Product>,
    cart: Cart,
    fade: ScrollFade,
    listeners: ListenerStore,
    scheduler: Scheduler,
    config: PageConfig,
    scroll_top: f64,
    scroll_frame: Option<i64>,
    alerts: Vec<String>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_media: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Harness {
    pub fn from_products(products: &[Product]) -> Result<Self> {
        Self::with_config(PageConfig::default(), products)
    }

    pub fn with_config(config: PageConfig, products: &[Product]) -> Result<Self> {
        if !config.viewport_height.is_finite() || config.viewport_height <= 0.0 {
            return Err(Error::Config(format!(
                "viewport_height must be finite and positive, got {}",
                config.viewport_height
            )));
        }
        if !config.section_offset.is_finite() {
            return Err(Error::Config(format!(
                "section_offset must be finite, got {}",
                config.section_offset
            )));
        }

        let (page, refs) = build_page(products);
        let mut harness = Self {
            page,
            refs,
            products: products.to_vec(),
            cart: Cart::new(),
            fade: ScrollFade::default(),
            listeners: ListenerStore::default(),
            scheduler: Scheduler::new(),
            config,
            scroll_top: 0.0,
            scroll_frame: None,
            alerts: Vec::new(),
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_media: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        };

        harness.wire_listeners();
        harness.run_load()?;
        Ok(harness)
    }

    fn wire_listeners(&mut self) {
        let refs = self.refs.clone();
        self.listeners
            .add(refs.intro_video, EventKind::Ended, HandlerKind::IntroEnded);
        self.listeners
            .add(refs.body, EventKind::Scroll, HandlerKind::ScrollTick);
        self.listeners
            .add(refs.body, EventKind::Click, HandlerKind::BackdropClose);
        for &video in &refs.product_videos {
            self.listeners
                .add(video, EventKind::RateChange, HandlerKind::RateLock);
        }
        for (index, _) in self.products.iter().enumerate() {
            if let Some(button) = self.page.by_id(&format!("purchase-button-{index}")) {
                self.listeners
                    .add(button, EventKind::Click, HandlerKind::PurchaseClick);
            }
            if let Some(button) = self.page.by_id(&format!("modal-add-{index}")) {
                self.listeners.add(
                    button,
                    EventKind::Click,
                    HandlerKind::ModalAddClick { product: index },
                );
            }
        }
        if let Some(order) = self.page.by_id("order-button") {
            self.listeners
                .add(order, EventKind::Click, HandlerKind::ModalOpenClick);
        }
        if let Some(close) = self.page.by_id("modal-close") {
            self.listeners
                .add(close, EventKind::Click, HandlerKind::ModalCloseClick);
        }
        if let Some(checkout) = self.page.by_id("checkout-button") {
            self.listeners
                .add(checkout, EventKind::Click, HandlerKind::CheckoutClick);
        }
    }

    fn run_load(&mut self) -> Result<()> {
        let intro = self.refs.intro_video;
        self.play_media(intro)?;
        for video in self.refs.product_videos.clone() {
            {
                let label = self.element_label(video);
                let media = self.page.media_mut(video, &label)?;
                media.playback_rate = 1.0;
                media.default_playback_rate = 1.0;
            }
            self.play_media(video)?;
        }
        Ok(())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_media(&mut self, enabled: bool) {
        self.trace_media = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::PageState(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        self.scheduler.set_step_limit(max_steps)
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_lines(&self) -> Vec<String> {
        self.cart.render_lines()
    }

    pub fn flags(&self) -> PlaybackFlags {
        self.fade.flags
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_top
    }

    pub fn modal_open(&self) -> bool {
        self.page.display(self.refs.modal) == DisplayMode::Block
    }

    pub fn body_scroll_locked(&self) -> bool {
        self.page.overflow(self.refs.body) == OverflowMode::Hidden
    }

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending_timers()
    }

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending_frames()
    }

    pub fn listener_count(&self, selector: &str, event: &str) -> Result<usize> {
        let target = self.select_one(selector)?;
        let kind = EventKind::parse(event)?;
        Ok(self.listeners.count(target, kind))
    }

    pub fn scroll_to(&mut self, offset: f64) -> Result<()> {
        if !offset.is_finite() || offset < 0.0 {
            return Err(Error::PageState(
                "scroll_to requires a finite, non-negative offset".into(),
            ));
        }
        if self.body_scroll_locked() {
            self.trace_event_line("[event] scroll dropped (body scroll locked)".into());
            return Ok(());
        }
        self.scroll_top = offset;
        self.dispatch_to(self.refs.body, EventKind::Scroll)
    }

    pub fn run_frame(&mut self) -> Result<bool> {
        let Some(frame) = self.scheduler.pop_frame() else {
            self.trace_event_line("[frame] run none".into());
            return Ok(false);
        };
        match frame.action {
            FrameAction::RecomputeFade => {
                self.recompute_fade();
                self.fade.ticking = false;
                self.scroll_frame = None;
            }
        }
        Ok(true)
    }

    pub fn cancel_pending_frame(&mut self) -> bool {
        let Some(frame_id) = self.scroll_frame.take() else {
            return false;
        };
        let existed = self.scheduler.cancel_frame(frame_id);
        self.fade.ticking = false;
        self.trace_event_line(format!("[frame] cancel id={frame_id} existed={existed}"));
        existed
    }

    pub fn run_frames(&mut self) -> Result<usize> {
        let mut ran = 0;
        while self.run_frame()? {
            ran += 1;
        }
        Ok(ran)
    }

    fn recompute_fade(&mut self) {
        let section_top = self.config.section_offset - self.scroll_top;
        let progress = fade::scroll_progress(section_top, self.config.viewport_height);
        if let Some(opacity) = self.fade.observe(progress) {
            self.page.set_opacity(self.refs.logo, opacity);
            self.trace_event_line(format!(
                "[frame] fade progress={progress:.4} opacity={opacity:.4}"
            ));
        } else {
            self.trace_event_line(format!("[frame] fade progress={progress:.4} opacity=kept"));
        }
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.page.disabled(target) {
            let label = self.element_label(target);
            self.trace_event_line(format!("[event] click ignored (disabled) target={label}"));
            return Ok(());
        }
        self.dispatch_to(target, EventKind::Click)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.page.disabled(target) {
            return Ok(());
        }
        let tag = self.page.tag_name(target).to_ascii_lowercase();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input".into(),
                actual: tag,
            });
        }
        self.page.set_value(target, text);
        self.dispatch_to(target, EventKind::Input)
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let kind = EventKind::parse(event)?;
        self.dispatch_to(target, kind)
    }

    pub fn end_video(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let status = self.page.media_mut(target, selector)?.status;
        match status {
            PlaybackStatus::Playing => {
                self.page.media_mut(target, selector)?.status = PlaybackStatus::Ended;
                let label = self.element_label(target);
                self.trace_media_line(format!("[media] ended {label}"));
                self.dispatch_to(target, EventKind::Ended)
            }
            PlaybackStatus::Ended => Ok(()),
            PlaybackStatus::Unstarted => Err(Error::MediaState {
                selector: selector.to_string(),
                expected: "playing".into(),
                actual: "unstarted".into(),
            }),
        }
    }

    pub fn end_intro_video(&mut self) -> Result<()> {
        self.end_video("#intro-video")
    }

    pub fn set_playback_rate(&mut self, selector: &str, rate: f64) -> Result<()> {
        if !rate.is_finite() {
            return Err(Error::PageState("playback rate must be finite".into()));
        }
        let target = self.select_one(selector)?;
        {
            let media = self.page.media_mut(target, selector)?;
            if media.playback_rate == rate {
                return Ok(());
            }
            media.playback_rate = rate;
        }
        let label = self.element_label(target);
        self.trace_media_line(format!("[media] ratechange {label} rate={rate}"));
        self.dispatch_to(target, EventKind::RateChange)
    }

    pub fn playback_rate(&self, selector: &str) -> Result<f64> {
        let target = self.select_one(selector)?;
        self.require_media(target, selector).map(|m| m.playback_rate)
    }

    pub fn playback_status(&self, selector: &str) -> Result<PlaybackStatus> {
        let target = self.select_one(selector)?;
        self.require_media(target, selector).map(|m| m.status)
    }

    pub fn open_order_modal(&mut self) -> Result<()> {
        self.open_modal_internal()
    }

    pub fn close_order_modal(&mut self) -> Result<()> {
        self.close_modal_internal()
    }

    pub fn add_to_cart(&mut self, flavor: &str, kind: &str, price: f64) {
        self.cart.add(flavor, kind, price);
        self.refresh_cart_display();
    }

    pub fn checkout(&mut self) -> Result<()> {
        self.run_checkout()
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::PageState(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms();
        self.scheduler.advance_clock_by(delta_ms);
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms,
            from,
            self.scheduler.now_ms(),
            ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms() {
            return Err(Error::PageState(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms()
            )));
        }
        let from = self.scheduler.now_ms();
        self.scheduler.advance_clock_to(target_ms);
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from,
            self.scheduler.now_ms(),
            ran
        ));
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms();
        let ran = self.run_timer_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from,
            self.scheduler.now_ms(),
            ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(task) = self.scheduler.pop_next(None) else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };
        if task.due_at > self.scheduler.now_ms() {
            self.scheduler.advance_clock_to(task.due_at);
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.scheduler.now_ms(),
            ran
        ));
        Ok(ran)
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let existed = self.scheduler.clear_timeout(timer_id);
        self.trace_timer_line(format!("[timer] clear id={timer_id} existed={existed}"));
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.scheduler.clear_all();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        let now = self.scheduler.now_ms();
        self.run_timer_queue(Some(now), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(task) = self.scheduler.pop_next(due_limit) {
            steps += 1;
            if steps > self.scheduler.step_limit() {
                return Err(Error::PageState(format!(
                    "timer queue exceeded step limit {} (next timer id={} due_at={})",
                    self.scheduler.step_limit(),
                    task.id,
                    task.due_at
                )));
            }
            if advance_clock && task.due_at > self.scheduler.now_ms() {
                self.scheduler.advance_clock_to(task.due_at);
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        match task.action {
            TimerAction::ResetPurchaseButton(button) => {
                self.page.set_text(button, PURCHASE_LABEL);
                self.page.remove_class(button, "purchased");
                self.page.set_disabled(button, false);
                let label = self.element_label(button);
                self.trace_timer_line(format!(
                    "[timer] run id={} action=reset-purchase target={label}",
                    task.id
                ));
            }
            TimerAction::ResetModalAddButton(button) => {
                self.page.set_text(button, PURCHASE_LABEL);
                self.page.remove_class(button, "added");
                let label = self.element_label(button);
                self.trace_timer_line(format!(
                    "[timer] run id={} action=reset-modal-add target={label}",
                    task.id
                ));
            }
        }
        Ok(())
    }

    fn dispatch_to(&mut self, target: ElementId, kind: EventKind) -> Result<()> {
        let target_label = self.element_label(target);
        self.trace_event_line(format!(
            "[event] {} target={target_label}",
            kind.as_str()
        ));

        let mut chain = vec![target];
        let mut cursor = target;
        while let Some(parent) = self.page.parent(cursor) {
            chain.push(parent);
            cursor = parent;
        }

        for current in chain {
            for listener in self.listeners.get(current, kind) {
                self.run_handler(listener.handler, current, target)?;
            }
        }
        Ok(())
    }

    fn run_handler(
        &mut self,
        handler: HandlerKind,
        current: ElementId,
        target: ElementId,
    ) -> Result<()> {
        match handler {
            HandlerKind::IntroEnded => self.run_intro_ended(),
            HandlerKind::ScrollTick => self.run_scroll_tick(),
            HandlerKind::RateLock => self.run_rate_lock(current),
            HandlerKind::PurchaseClick => self.run_purchase_click(current),
            HandlerKind::ModalOpenClick => self.open_modal_internal(),
            HandlerKind::ModalCloseClick => self.close_modal_internal(),
            HandlerKind::ModalAddClick { product } => self.run_modal_add_click(current, product),
            HandlerKind::CheckoutClick => self.run_checkout(),
            HandlerKind::BackdropClose => {
                if target == self.refs.modal {
                    self.close_modal_internal()
                } else {
                    Ok(())
                }
            }
        }
    }

    fn run_intro_ended(&mut self) -> Result<()> {
        self.fade.flags.video_ended = true;
        self.fade.flags.video_played = true;
        if !self.fade.flags.user_scrolled {
            self.page.set_opacity(self.refs.logo, 1.0);
            self.trace_event_line("[event] logo revealed (no scroll before video end)".into());
        }
        Ok(())
    }

    fn run_scroll_tick(&mut self) -> Result<()> {
        if self.fade.ticking {
            self.trace_event_line("[frame] coalesced".into());
            return Ok(());
        }
        let frame_id = self.scheduler.request_frame(FrameAction::RecomputeFade);
        self.fade.ticking = true;
        self.scroll_frame = Some(frame_id);
        self.trace_event_line(format!("[frame] scheduled id={frame_id}"));
        Ok(())
    }

    fn run_rate_lock(&mut self, video: ElementId) -> Result<()> {
        let label = self.element_label(video);
        let coerced_from = {
            let media = self.page.media_mut(video, &label)?;
            if media.playback_rate == 1.0 {
                None
            } else {
                let was = media.playback_rate;
                media.playback_rate = 1.0;
                Some(was)
            }
        };
        if let Some(was) = coerced_from {
            self.trace_media_line(format!("[media] rate coerced {label} from={was} to=1"));
        }
        Ok(())
    }

    fn run_purchase_click(&mut self, button: ElementId) -> Result<()> {
        if self.page.has_class(button, "purchased") {
            return Ok(());
        }
        self.page.set_text(button, PURCHASED_LABEL);
        self.page.add_class(button, "purchased");
        self.page.set_disabled(button, true);
        let timer_id = self
            .scheduler
            .set_timeout(TimerAction::ResetPurchaseButton(button), PURCHASE_RESET_MS);
        self.trace_timer_line(format!(
            "[timer] set id={timer_id} delay_ms={PURCHASE_RESET_MS} action=reset-purchase"
        ));
        Ok(())
    }

    fn run_modal_add_click(&mut self, button: ElementId, product: usize) -> Result<()> {
        let Some(product) = self.products.get(product).cloned() else {
            return Err(Error::PageState(format!(
                "modal button references unknown product {product}"
            )));
        };
        self.page.set_text(button, MODAL_ADDED_LABEL);
        self.page.add_class(button, "added");
        self.cart.add(&product.flavor, &product.kind, product.price);
        self.refresh_cart_display();
        let timer_id = self
            .scheduler
            .set_timeout(TimerAction::ResetModalAddButton(button), MODAL_ADD_RESET_MS);
        self.trace_timer_line(format!(
            "[timer] set id={timer_id} delay_ms={MODAL_ADD_RESET_MS} action=reset-modal-add"
        ));
        Ok(())
    }

    fn run_checkout(&mut self) -> Result<()> {
        if self.cart.is_empty() {
            self.alert(EMPTY_CART_ALERT.to_string());
            return Ok(());
        }
        let email = self.page.value(self.refs.email_input).to_string();
        if !email.is_empty() && email.contains('@') {
            self.alert(format!(
                "Thanks for the email {email}! 📧\n\nYou're signed up for deals (in theory).\n\nAnd thanks for pretending to buy our stuff! In real life, this would process your order. But since this is a demo, just know we appreciate you. 🍹"
            ));
        } else {
            self.alert(CHECKOUT_GENERIC_ALERT.to_string());
        }
        self.cart.clear();
        self.refresh_cart_display();
        Ok(())
    }

    fn open_modal_internal(&mut self) -> Result<()> {
        self.page.set_display(self.refs.modal, DisplayMode::Block);
        self.page.set_overflow(self.refs.body, OverflowMode::Hidden);
        for video in self.refs.modal_videos.clone() {
            self.play_media(video)?;
        }
        self.refresh_cart_display();
        self.trace_event_line("[event] modal opened".into());
        Ok(())
    }

    fn close_modal_internal(&mut self) -> Result<()> {
        self.page.set_display(self.refs.modal, DisplayMode::None);
        self.page.set_overflow(self.refs.body, OverflowMode::Auto);
        self.trace_event_line("[event] modal closed".into());
        Ok(())
    }

    fn play_media(&mut self, element: ElementId) -> Result<()> {
        let label = self.element_label(element);
        let status = self.page.media_mut(element, &label)?.status;
        match status {
            PlaybackStatus::Unstarted => {
                if self.config.autoplay == AutoplayPolicy::Block {
                    self.trace_media_line(format!(
                        "[media] autoplay prevented: NotAllowedError {label}"
                    ));
                } else {
                    self.page.media_mut(element, &label)?.status = PlaybackStatus::Playing;
                    self.trace_media_line(format!("[media] play {label}"));
                }
            }
            PlaybackStatus::Playing => {}
            PlaybackStatus::Ended => {
                self.trace_media_line(format!("[media] play ignored (ended) {label}"));
            }
        }
        Ok(())
    }

    fn refresh_cart_display(&mut self) {
        let lines = self.cart.render_lines();
        self.page.set_text(self.refs.cart_items, &lines.join("\n"));
        let total = self.cart.formatted_total();
        self.page.set_text(self.refs.cart_total, &total);
        self.trace_event_line(format!(
            "[cart] refresh items={} total={total}",
            self.cart.len()
        ));
    }

    fn alert(&mut self, message: String) {
        self.trace_event_line(format!(
            "[event] alert {}",
            message.lines().next().unwrap_or_default()
        ));
        self.alerts.push(message);
    }

    fn require_media(&self, element: ElementId, selector: &str) -> Result<&MediaState> {
        self.page.media(element).ok_or_else(|| Error::TypeMismatch {
            selector: selector.to_string(),
            expected: "video".into(),
            actual: self.page.tag_name(element).to_string(),
        })
    }

    fn select_one(&self, selector: &str) -> Result<ElementId> {
        selector::select_one(&self.page, selector)
    }

    pub fn select_count(&self, selector: &str) -> Result<usize> {
        selector::select_all(&self.page, selector).map(|matches| matches.len())
    }

    fn element_label(&self, element: ElementId) -> String {
        let node = self.page.node(element);
        if let Some(id) = &node.id {
            format!("#{id}")
        } else if let Some(class) = node.classes.first() {
            format!(".{class}")
        } else {
            node.tag_name.clone()
        }
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.page.text(target).to_string())
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.page.value(target).to_string())
    }

    pub fn opacity(&self, selector: &str) -> Result<f64> {
        let target = self.select_one(selector)?;
        self.page.opacity(target).ok_or_else(|| {
            Error::PageState(format!("element has no opacity style: {selector}"))
        })
    }

    pub fn has_class(&self, selector: &str, class: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.page.has_class(target, class))
    }

    pub fn is_disabled(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.page.disabled(target))
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.text(target);
        if nfc(actual) != nfc(expected) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.page.snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.value(target);
        if nfc(actual) != nfc(expected) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.page.snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_opacity(&self, selector: &str, expected: f64) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.opacity(target).ok_or_else(|| {
            Error::PageState(format!("element has no opacity style: {selector}"))
        })?;
        if (actual - expected).abs() > 1e-9 {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("opacity {expected}"),
                actual: format!("opacity {actual}"),
                dom_snippet: self.page.snippet(target),
            });
        }
        Ok(())
    }

    pub fn cart_contents(&self) -> &[CartItem] {
        self.cart.items()
    }

    fn trace_line(&mut self, category_enabled: bool, line: String) {
        if !self.trace || !category_enabled {
            return;
        }
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        if self.trace_logs.len() >= self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        self.trace_logs.push(line);
    }

    fn trace_event_line(&mut self, line: String) {
        let enabled = self.trace_events;
        self.trace_line(enabled, line);
    }

    fn trace_timer_line(&mut self, line: String) {
        let enabled = self.trace_timers;
        self.trace_line(enabled, line);
    }

    fn trace_media_line(&mut self, line: String) {
        let enabled = self.trace_media;
        self.trace_line(enabled, line);
    }
}

fn nfc(text: &str) -> String {
    text.nfc().collect()
}

fn build_page(products: &[Product]) -> (Page, PageRefs) {
    let mut page = Page::new();
    let body = page.root();

    let intro_video = page.create_element(body, "video");
    page.set_id(intro_video, "intro-video");
    page.attach_media(intro_video, MediaState::new());

    let section = page.create_element(body, "section");
    page.add_class(section, "scroll-anim");
    let logo = page.create_element(section, "img");
    page.add_class(logo, "scroll-logo");
    page.set_opacity(logo, 0.0);

    let mut product_videos = Vec::with_capacity(products.len());
    for (index, _) in products.iter().enumerate() {
        let card = page.create_element(body, "section");
        page.add_class(card, "product-card");
        let video = page.create_element(card, "video");
        page.set_id(video, &format!("product-video-{index}"));
        page.add_class(video, "product-video");
        page.attach_media(video, MediaState::new());
        product_videos.push(video);

        let button = page.create_element(card, "button");
        page.set_id(button, &format!("purchase-button-{index}"));
        page.add_class(button, "purchase-button");
        page.set_text(button, PURCHASE_LABEL);
    }

    let order_button = page.create_element(body, "button");
    page.set_id(order_button, "order-button");
    page.set_text(order_button, "Order Now");

    let modal = page.create_element(body, "div");
    page.set_id(modal, "orderModal");
    page.set_display(modal, DisplayMode::None);
    let content = page.create_element(modal, "div");
    page.set_id(content, "modal-content");

    let close = page.create_element(content, "span");
    page.set_id(close, "modal-close");
    page.set_text(close, "×");

    let mut modal_videos = Vec::with_capacity(products.len());
    for (index, _) in products.iter().enumerate() {
        let video = page.create_element(content, "video");
        page.set_id(video, &format!("modal-video-{index}"));
        page.add_class(video, "modal-video");
        page.attach_media(video, MediaState::new());
        modal_videos.push(video);

        let button = page.create_element(content, "button");
        page.set_id(button, &format!("modal-add-{index}"));
        page.add_class(button, "modal-add");
        page.set_text(button, PURCHASE_LABEL);
    }

    let cart_items = page.create_element(content, "div");
    page.set_id(cart_items, "cartItems");
    let cart_total = page.create_element(content, "span");
    page.set_id(cart_total, "cartTotal");
    page.set_text(cart_total, "0.00");

    let email_input = page.create_element(content, "input");
    page.set_id(email_input, "promoEmail");

    let checkout_button = page.create_element(content, "button");
    page.set_id(checkout_button, "checkout-button");
    page.set_text(checkout_button, "Checkout");

    let refs = PageRefs {
        body,
        intro_video,
        logo,
        modal,
        cart_items,
        cart_total,
        email_input,
        product_videos,
        modal_videos,
    };
    (page, refs)
}
