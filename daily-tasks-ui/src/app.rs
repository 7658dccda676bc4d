//! App Root Component
//!
//! Heading, the two category tabs, and the active tab's form.

use leptos::*;

use daily_tasks::Category;

use crate::components::FormTab;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let (active, set_active) = create_signal(Category::default());
    // Re-clicking the open tab must not remount it
    let current = create_memo(move |_| active.get());

    view! {
        <div class="min-h-screen bg-gray-50">
            <div class="max-w-4xl mx-auto px-4 py-8">
                <header class="text-center mb-8">
                    <h1 class="text-3xl font-bold text-gray-900">"Daily Tasks"</h1>
                    <p class="text-gray-600 mt-2">"Update Your Daily Work Here"</p>
                </header>

                <nav class="flex space-x-2 mb-6 border-b border-gray-200">
                    {Category::all().iter().map(|&category| view! {
                        <TabButton
                            category=category
                            active=active
                            on_click=move |_| set_active.set(category)
                        />
                    }).collect_view()}
                </nav>

                // Only the active tab is mounted; switching drops the other
                // tab's subscription and draft
                {move || {
                    let category = current.get();
                    view! { <FormTab category=category /> }
                }}
            </div>
        </div>
    }
}

#[component]
fn TabButton(
    category: Category,
    active: ReadSignal<Category>,
    on_click: impl Fn(web_sys::MouseEvent) + 'static,
) -> impl IntoView {
    view! {
        <button
            type="button"
            on:click=on_click
            class=move || {
                let base = "px-4 py-2 -mb-px text-sm font-medium border-b-2 transition-colors";
                if active.get() == category {
                    format!("{} border-blue-600 text-blue-600", base)
                } else {
                    format!("{} border-transparent text-gray-500 hover:text-gray-700", base)
                }
            }
        >
            {category.title()}
        </button>
    }
}
