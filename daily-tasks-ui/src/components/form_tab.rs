//! Form Tab
//!
//! Entry form for one category with its live table underneath.

use leptos::*;

use daily_tasks::{Category, Field, FieldErrors, FormFields};

use super::EntriesTable;
use crate::api;
use crate::state::use_form_entries;

/// Form and table for `category`
#[component]
pub fn FormTab(category: Category) -> impl IntoView {
    let state = use_form_entries(category);

    let fields = create_rw_signal(FormFields::default());
    let errors = create_rw_signal(FieldErrors::default());
    let (submitting, set_submitting) = create_signal(false);

    let set_field = move |field: Field, value: String| {
        fields.update(|f| f.set(field, value));
        errors.update(|e| e.clear_field(field));
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let draft = match fields.get_untracked().validate(category) {
            Ok(draft) => draft,
            Err(found) => {
                errors.set(found);
                return;
            }
        };
        errors.set(FieldErrors::default());

        set_submitting.set(true);
        spawn_local(async move {
            let result = api::insert_entry(&api::settings(), &draft).await;
            set_submitting.set(false);
            fields.set(FormFields::default());

            // The new row arrives through the change feed
            if let Err(e) = result {
                web_sys::console::error_1(&format!("Failed to submit entry: {}", e).into());
                state.error.set(Some(e));
            }
        });
    };

    view! {
        <div class="space-y-8">
            <form on:submit=on_submit class="bg-white rounded-lg shadow p-6 space-y-4">
                <h2 class="text-xl font-semibold text-gray-800">{category.title()}</h2>

                <div>
                    <label class="block text-sm font-medium text-gray-700 mb-1">
                        {Field::Date.label()}
                    </label>
                    <input
                        type="date"
                        prop:value=move || fields.with(|f| f.date.clone())
                        on:input=move |ev| set_field(Field::Date, event_target_value(&ev))
                        class="w-full border border-gray-300 rounded-md px-3 py-2"
                    />
                    <FieldError field=Field::Date errors=errors />
                </div>

                <div>
                    <label class="block text-sm font-medium text-gray-700 mb-1">
                        {Field::ReferralLink.label()}
                    </label>
                    <input
                        type="url"
                        placeholder="https://..."
                        prop:value=move || fields.with(|f| f.referral_link.clone())
                        on:input=move |ev| set_field(Field::ReferralLink, event_target_value(&ev))
                        class="w-full border border-gray-300 rounded-md px-3 py-2"
                    />
                    <FieldError field=Field::ReferralLink errors=errors />
                </div>

                <div>
                    <label class="block text-sm font-medium text-gray-700 mb-1">
                        {Field::Comment.label()}
                    </label>
                    <textarea
                        rows="4"
                        prop:value=move || fields.with(|f| f.comment.clone())
                        on:input=move |ev| set_field(Field::Comment, event_target_value(&ev))
                        class="w-full border border-gray-300 rounded-md px-3 py-2"
                    />
                    <FieldError field=Field::Comment errors=errors />
                </div>

                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="w-full bg-blue-600 hover:bg-blue-700 disabled:bg-gray-400
                           disabled:cursor-not-allowed text-white rounded-md py-2 font-semibold"
                >
                    {move || if submitting.get() { "Submitting..." } else { "Submit" }}
                </button>
            </form>

            <div class="bg-white rounded-lg shadow p-6">
                <h3 class="text-lg font-semibold text-gray-800 mb-4">"Entries"</h3>

                {move || state.error.get().map(|e| view! {
                    <div class="mb-4 rounded-md bg-red-50 border border-red-200 px-4 py-3 text-red-700">
                        {format!("Error: {}", e)}
                    </div>
                })}

                {move || if state.loading.get() {
                    view! { <p class="text-center text-gray-500 py-8">"Loading entries..."</p> }.into_view()
                } else {
                    view! { <EntriesTable entries=state.entries /> }.into_view()
                }}
            </div>
        </div>
    }
}

/// Inline message under a field
#[component]
fn FieldError(field: Field, errors: RwSignal<FieldErrors>) -> impl IntoView {
    move || {
        errors.with(|e| e.get(field).map(str::to_string)).map(|message| {
            view! { <p class="mt-1 text-sm text-red-600">{message}</p> }
        })
    }
}
