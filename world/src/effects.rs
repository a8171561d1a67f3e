//! Helpers that push presentation requests into the event stream.

use endless_assault_core::{Effect, Event, SoundCue, Vec2};

pub(crate) fn emit(out: &mut Vec<Event>, effect: Effect) {
    out.push(Event::Effect(effect));
}

pub(crate) fn sound(out: &mut Vec<Event>, cue: SoundCue, volume: f32) {
    emit(out, Effect::Sound { cue, volume });
}

pub(crate) fn shake(out: &mut Vec<Event>, magnitude: f32) {
    emit(out, Effect::Shake { magnitude });
}

pub(crate) fn explosion(out: &mut Vec<Event>, position: Vec2, radius: f32) {
    emit(out, Effect::Explosion { position, radius });
}

pub(crate) fn notify(out: &mut Vec<Event>, text: impl Into<String>, duration: f32) {
    emit(
        out,
        Effect::Notification {
            text: text.into(),
            duration,
        },
    );
}
